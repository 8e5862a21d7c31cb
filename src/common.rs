use embedded_hal::i2c::SevenBitAddress;

use crate::conversions::{
    Rounded, humidity_reading_to_percent_rh, humidity_reading_to_percent_rh_f64, round_f64,
    temperature_reading_to_celsius, temperature_reading_to_celsius_f64,
    temperature_reading_to_fahrenheit,
};
use crate::crc::validate_crc;

pub(crate) const SOFT_RESET_COMMAND: [u8; 2] = [0x30, 0xA2];
/// Single shot, high repeatability, clock stretching enabled.
pub(crate) const SINGLE_SHOT_HIGH_REPEATABILITY_COMMAND: [u8; 2] = [0x2C, 0x06];

/// Time for the sensor to come up after power is applied. The datasheet
/// gives 1ms at most; we allow a little extra.
pub(crate) const STARTUP_DELAY_MS: u32 = 2;
/// Time for the sensor to come back after a soft reset (1.5ms max).
pub(crate) const SOFT_RESET_DELAY_MS: u32 = 2;
/// High repeatability measurements take up to 15ms.
pub(crate) const MEASUREMENT_DELAY_MS: u32 = 20;

/// Addresses probed by a bus scan. Everything outside this range is
/// reserved by the I2C specification.
pub(crate) const SCAN_RANGE: core::ops::RangeInclusive<SevenBitAddress> = 0x08..=0x77;

/// I2C address of the sensor, selected by the level of its ADDR pin.
///
/// See section 3.2 (table 7) of the [datasheet].
///
/// [datasheet]: https://sensirion.com/media/documents/213E6A3B/63A5A569/Datasheet_SHT3x_DIS.pdf
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceAddress {
    /// ADDR pin connected to VSS: 0x44
    #[default]
    Low,
    /// ADDR pin connected to VDD: 0x45
    High,
}

impl From<DeviceAddress> for SevenBitAddress {
    fn from(value: DeviceAddress) -> Self {
        match value {
            DeviceAddress::Low => 0x44,
            DeviceAddress::High => 0x45,
        }
    }
}

/// Set of 7-bit addresses that acknowledged a bus scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AddressSet(u128);

impl AddressSet {
    pub const fn new() -> Self {
        Self(0)
    }

    /// Add `address` to the set. Values that are not 7-bit addresses are
    /// ignored.
    pub fn insert(&mut self, address: SevenBitAddress) {
        if address <= 0x7F {
            self.0 |= 1 << address;
        }
    }

    pub fn contains(&self, address: SevenBitAddress) -> bool {
        address <= 0x7F && self.0 & (1 << address) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Addresses in the set, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = SevenBitAddress> + '_ {
        (0..=0x7F).filter(|&address| self.contains(address))
    }
}

impl FromIterator<SevenBitAddress> for AddressSet {
    fn from_iter<T: IntoIterator<Item = SevenBitAddress>>(iter: T) -> Self {
        let mut set = AddressSet::new();
        for address in iter {
            set.insert(address);
        }
        set
    }
}

/// Number of decimal places to round each converted value to.
///
/// Zero places produce an integral [`Rounded::Integer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Precision {
    pub temperature_decimals: u8,
    pub humidity_decimals: u8,
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            temperature_decimals: 2,
            humidity_decimals: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub address: DeviceAddress,
    pub precision: Precision,
}

/// Which of the two CRC-protected words of a response failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CrcFailure {
    TemperatureBytes,
    HumidityBytes,
}

impl core::fmt::Display for CrcFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CrcFailure::TemperatureBytes => f.write_str("temperature bytes"),
            CrcFailure::HumidityBytes => f.write_str("humidity bytes"),
        }
    }
}

/// Internal wrapper around the 6 bytes read from the sensor, so that the
/// 4 data bytes may only be accessed after passing CRC verification.
pub(crate) struct Unvalidated([u8; 6]);

impl Unvalidated {
    pub(crate) fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Return the data bytes from the sensor if the CRC for each word
    /// is valid, otherwise report the first word that failed.
    ///
    /// If we name the bytes read from the sensor `s0` through `s5`, the
    /// bytes returned from this method are `[s0, s1, s3, s4]`, as bytes
    /// `s2` and `s5` are CRC values for the preceding two bytes.
    pub(crate) fn try_get_bytes(self) -> Result<[u8; 4], CrcFailure> {
        let [t0, t1, t_crc, h0, h1, h_crc] = self.0;
        validate_crc([t0, t1, t_crc]).map_err(|_| CrcFailure::TemperatureBytes)?;
        validate_crc([h0, h1, h_crc]).map_err(|_| CrcFailure::HumidityBytes)?;
        Ok([t0, t1, h0, h1])
    }
}

/// A validated measurement.
///
/// `temperature` (°C) and `humidity` (%RH) are rounded according to the
/// [`Precision`] the measurement was taken with. The unrounded values
/// are available from [`celsius`](Self::celsius) and
/// [`humidity_percent`](Self::humidity_percent).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    pub raw_temperature_reading: u16,
    pub raw_humidity_reading: u16,
    pub temperature: Rounded,
    pub humidity: Rounded,
}

impl Measurement {
    pub fn from_raw(
        raw_temperature_reading: u16,
        raw_humidity_reading: u16,
        precision: Precision,
    ) -> Self {
        let temperature = round_f64(
            temperature_reading_to_celsius_f64(raw_temperature_reading),
            precision.temperature_decimals,
        );
        let humidity = round_f64(
            humidity_reading_to_percent_rh_f64(raw_humidity_reading),
            precision.humidity_decimals,
        );
        Measurement {
            raw_temperature_reading,
            raw_humidity_reading,
            temperature,
            humidity,
        }
    }

    pub fn celsius(&self) -> f32 {
        temperature_reading_to_celsius(self.raw_temperature_reading)
    }

    pub fn fahrenheit(&self) -> f32 {
        temperature_reading_to_fahrenheit(self.raw_temperature_reading)
    }

    pub fn humidity_percent(&self) -> f32 {
        humidity_reading_to_percent_rh(self.raw_humidity_reading)
    }
}

/// Outcome of a measurement that completed on the bus.
///
/// Noise on the bus can corrupt a response, so an invalid reading is an
/// expected result rather than an error. Either both words of the response
/// validate or the whole reading is invalid.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub enum Reading {
    Valid(Measurement),
    Invalid(CrcFailure),
}

impl Reading {
    pub(crate) fn from_read_bytes(sensor_data: Unvalidated, precision: Precision) -> Self {
        match sensor_data.try_get_bytes() {
            Ok([t0, t1, h0, h1]) => Reading::Valid(Measurement::from_raw(
                u16::from_be_bytes([t0, t1]),
                u16::from_be_bytes([h0, h1]),
                precision,
            )),
            Err(failure) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("SHT3x CRC validation failed for {}", failure);
                Reading::Invalid(failure)
            }
        }
    }

    pub fn valid(self) -> Option<Measurement> {
        match self {
            Reading::Valid(measurement) => Some(measurement),
            Reading::Invalid(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Reading::Valid(_))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crc::crc8;

    fn frame(temperature: u16, humidity: u16) -> [u8; 6] {
        let [t0, t1] = temperature.to_be_bytes();
        let [h0, h1] = humidity.to_be_bytes();
        [t0, t1, crc8(&[t0, t1]), h0, h1, crc8(&[h0, h1])]
    }

    #[test]
    fn address_pins() {
        assert_eq!(SevenBitAddress::from(DeviceAddress::default()), 0x44);
        assert_eq!(SevenBitAddress::from(DeviceAddress::High), 0x45);
    }

    #[test]
    fn empty_address_set() {
        let set = AddressSet::new();
        assert!(set.is_empty());
        assert!(!set.contains(0x44));
        assert_eq!(set.iter().count(), 0);
    }

    #[test]
    fn address_set_with_neighbours() {
        let set: AddressSet = [0x20, 0x44, 0x68, 0x77].into_iter().collect();
        assert!(set.contains(0x44));
        assert!(!set.contains(0x45));
        assert_eq!(set.len(), 4);
        assert!(set.iter().eq([0x20, 0x44, 0x68, 0x77]));
    }

    #[test]
    fn address_set_ignores_out_of_range() {
        let mut set = AddressSet::new();
        set.insert(0x80);
        set.insert(0xFF);
        assert!(set.is_empty());
        assert!(!set.contains(0xFF));
    }

    #[test]
    fn valid_frame() {
        let reading = Reading::from_read_bytes(Unvalidated::new(frame(0x656E, 0x8143)), Precision::default());
        let Reading::Valid(m) = reading else {
            panic!("expected a valid reading, got {reading:?}");
        };
        assert_eq!(m.raw_temperature_reading, 0x656E);
        assert_eq!(m.raw_humidity_reading, 0x8143);
        // 0x656E = 25966 -> 24.34°C; 0x8143 = 33091 -> 50.49%RH
        assert!((m.temperature.as_f32() - 24.34).abs() < 1e-4, "{m:?}");
        assert_eq!(m.humidity, Rounded::Integer(50));
    }

    #[test]
    fn corrupt_temperature_crc() {
        let mut bytes = frame(0x656E, 0x8143);
        bytes[2] ^= 0x01;
        let reading = Reading::from_read_bytes(Unvalidated::new(bytes), Precision::default());
        assert_eq!(reading, Reading::Invalid(CrcFailure::TemperatureBytes));
        assert_eq!(reading.valid(), None);
    }

    #[test]
    fn corrupt_humidity_crc() {
        let mut bytes = frame(0x656E, 0x8143);
        bytes[5] ^= 0x80;
        let reading = Reading::from_read_bytes(Unvalidated::new(bytes), Precision::default());
        assert_eq!(reading, Reading::Invalid(CrcFailure::HumidityBytes));
        assert!(!reading.is_valid());
    }

    /// Raw values whose `f32` conversion lands on the wrong side of a
    /// hundredths boundary, with the correctly rounded result in
    /// hundredths of a degree.
    #[test]
    fn temperature_rounds_from_exact_value() {
        let cases: [(u16, i32); 13] = [
            (455, -4379),
            (1365, -4136),
            (11742, -1364),
            (12652, -1121),
            (13562, -879),
            (25759, 2379),
            (37956, 5636),
            (49243, 8650),
            (51063, 9136),
            (52340, 9477),
            (52883, 9621),
            (53793, 9864),
            (60530, 11664),
        ];
        for (raw, hundredths) in cases {
            let m = Measurement::from_raw(raw, 0, Precision::default());
            let expected = hundredths as f32 / 100.0;
            assert_eq!(m.temperature, Rounded::Decimal { value: expected, decimals: 2 }, "raw {raw}");
        }
    }

    #[test]
    fn humidity_rounds_from_exact_value() {
        let precision = Precision {
            temperature_decimals: 2,
            humidity_decimals: 2,
        };
        // 9034 / 65535 * 100 = 13.7850004, which an f32 pulls below the tie.
        let m = Measurement::from_raw(0, 9034, precision);
        assert_eq!(m.humidity, Rounded::Decimal { value: 13.79, decimals: 2 });
    }

    #[test]
    fn extremes_are_not_clamped() {
        let m = Measurement::from_raw(0xFFFF, 0xFFFF, Precision::default());
        assert_eq!(m.temperature.as_f32(), 130.0);
        assert_eq!(m.humidity, Rounded::Integer(100));
        let m = Measurement::from_raw(0x0000, 0x0000, Precision::default());
        assert_eq!(m.temperature.as_f32(), -45.0);
        assert_eq!(m.humidity, Rounded::Integer(0));
    }
}
