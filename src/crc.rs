/// Calculate the CRC8 for the given bytes.
///
/// Pass the two data bytes of a word to compute its checksum, or pass the
/// two data bytes followed by the CRC byte read from the sensor, in which
/// case the result will be 0 if the CRC byte is correct.
///
/// # Example usage
///
/// ```rust
/// use sht3x_rjw::crc::crc8;
///
/// // Example taken from the datasheet.
/// assert_eq!(crc8(&[0xBE, 0xEF]), 0x92);
/// assert_eq!(crc8(&[0xBE, 0xEF, 0x92]), 0);
/// ```
///
/// # CRC details
///
/// This is pre-set with the polynomial 0x31 and the initial value of 0xFF,
/// with no reflection or final XOR, as specified in section 4.12 of the
/// [datasheet].
///
/// [datasheet]: https://sensirion.com/media/documents/213E6A3B/63A5A569/Datasheet_SHT3x_DIS.pdf
#[must_use]
pub fn crc8(bytes: &[u8]) -> u8 {
    const fn top_bit_set(b: u8) -> bool {
        b & 0x80 == 0x80
    }

    const POLYNOMIAL: u8 = 0x31;
    const INITIAL: u8 = 0xFF;

    let mut crc: u8 = INITIAL;
    for byte in bytes {
        crc ^= byte; // "XOR-in" the next byte.
        for _ in 0..8 {
            if top_bit_set(crc) {
                // The x^8 term of the polynomial is implicit, so the top bit
                // is shifted out before the remaining terms are applied.
                crc = (crc << 1) ^ POLYNOMIAL;
            } else {
                crc <<= 1;
            }
        }
    }

    crc
}

/// A wrapper around [`crc8`] that relieves the caller of having
/// to compare the CRC result to 0.
///
/// On failure the nonzero remainder is returned.
pub fn validate_crc(word: [u8; 3]) -> Result<(), u8> {
    match crc8(&word) {
        0 => Ok(()),
        x => Err(x),
    }
}

#[cfg(test)]
mod test {
    use super::{crc8, validate_crc};

    #[test]
    fn crc_0000() {
        assert_eq!(crc8(&[0x00, 0x00]), 0x81);
        assert_eq!(validate_crc([0x00, 0x00, 0x81]), Ok(()));
    }

    #[test]
    #[allow(non_snake_case)]
    fn crc_BEEF() {
        assert_eq!(crc8(&[0xBE, 0xEF]), 0x92);
        assert_eq!(validate_crc([0xBE, 0xEF, 0x92]), Ok(()));
    }

    #[test]
    fn crc_is_pure() {
        let first = crc8(&[0x65, 0x6E]);
        // Unrelated work in between must not leak into the next call.
        let _ = crc8(&[0xFF, 0xFF, 0xFF]);
        assert_eq!(crc8(&[0x65, 0x6E]), first);
    }

    #[test]
    fn appended_crc_always_validates() {
        for word in 0..=u16::MAX {
            let [msb, lsb] = word.to_be_bytes();
            let crc = crc8(&[msb, lsb]);
            assert_eq!(validate_crc([msb, lsb, crc]), Ok(()), "word {word:#06X}");
        }
    }

    #[test]
    fn single_bit_flips_are_detected() {
        for word in (0..=u16::MAX).step_by(257) {
            let [msb, lsb] = word.to_be_bytes();
            let valid = [msb, lsb, crc8(&[msb, lsb])];
            for bit in 0..24 {
                let mut corrupted = valid;
                corrupted[bit / 8] ^= 1 << (bit % 8);
                assert!(
                    validate_crc(corrupted).is_err(),
                    "word {word:#06X} with bit {bit} flipped"
                );
            }
        }
    }
}
