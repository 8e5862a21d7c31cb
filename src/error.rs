use embedded_hal::i2c::SevenBitAddress;

/// Errors returned by the driver.
///
/// A CRC mismatch in the sensor's response is not an error: it is reported
/// as [`Reading::Invalid`](crate::common::Reading::Invalid) so that callers
/// polling the sensor can simply try again.
#[derive(Debug)]
pub enum Error<I2cError>
where
    I2cError: embedded_hal::i2c::Error,
{
    /// The sensor neither answered the presence check nor accepted a reset.
    NotFound(SevenBitAddress),
    I2c(I2cError),
}

impl<I2cError> From<I2cError> for Error<I2cError>
where
    I2cError: embedded_hal::i2c::Error,
{
    fn from(value: I2cError) -> Self {
        Error::I2c(value)
    }
}

impl<I2cError> core::fmt::Display for Error<I2cError>
where
    I2cError: embedded_hal::i2c::Error,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::NotFound(address) => {
                write!(f, "No SHT3x sensor found at address {address:#04X}")
            }
            Error::I2c(e) => write!(f, "Received I2C error: {:?}", e),
        }
    }
}

impl<I> core::error::Error for Error<I> where I: embedded_hal::i2c::Error {}

#[cfg(feature = "defmt")]
impl<I> defmt::Format for Error<I>
where
    I: embedded_hal::i2c::Error,
{
    fn format(&self, f: defmt::Formatter<'_>) {
        match self {
            Error::NotFound(address) => defmt::write!(f, "NotFound({=u8:#x})", *address),
            Error::I2c(e) => defmt::write!(f, "I2c({})", defmt::Debug2Format(&e.kind())),
        }
    }
}
