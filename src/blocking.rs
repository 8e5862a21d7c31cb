use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{I2c, SevenBitAddress};

use crate::common::{
    AddressSet, Config, MEASUREMENT_DELAY_MS, Precision, Reading, SCAN_RANGE,
    SINGLE_SHOT_HIGH_REPEATABILITY_COMMAND, SOFT_RESET_COMMAND, SOFT_RESET_DELAY_MS,
    STARTUP_DELAY_MS, Unvalidated,
};
use crate::error::Error;

/// Probe every non-reserved address on the bus with an empty write,
/// collecting those that acknowledge.
///
/// Any error from the bus, a NACK or otherwise, marks the address as absent.
pub fn scan<I: I2c>(i2c: &mut I) -> AddressSet {
    let mut found = AddressSet::new();
    for address in SCAN_RANGE {
        if i2c.write(address, &[]).is_ok() {
            #[cfg(feature = "defmt")]
            defmt::debug!("I2C device found at {=u8:#x}", address);
            found.insert(address);
        }
    }
    found
}

/// Whether a device at `address` responds to a bus scan.
pub fn detect<I: I2c>(i2c: &mut I, address: SevenBitAddress) -> bool {
    scan(i2c).contains(address)
}

pub struct SHT3x<I: I2c> {
    i2c: I,
    read_buffer: [u8; 6],
    pub address: SevenBitAddress,
    pub config: Config,
}

impl<I: I2c> SHT3x<I> {
    /// Create the driver without touching the bus.
    pub fn new(i2c: I, config: Config) -> Self {
        Self {
            i2c,
            address: config.address.into(),
            read_buffer: [0u8; 6],
            config,
        }
    }

    /// Create the driver after checking the sensor is on the bus.
    ///
    /// Waits out the sensor's power-up time and scans for the sensor. A
    /// sensor that answers the scan is used as-is. One that does not is
    /// sent a soft reset, and if that is also rejected [`Error::NotFound`]
    /// is returned.
    pub fn init(i2c: I, mut delay: impl DelayNs, config: Config) -> Result<Self, Error<I::Error>> {
        let mut sensor = Self::new(i2c, config);
        delay.delay_ms(STARTUP_DELAY_MS);

        if sensor.is_present() {
            return Ok(sensor);
        }
        match sensor.soft_reset(&mut delay) {
            Ok(()) => Ok(sensor),
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("No SHT3x found at {=u8:#x}", sensor.address);
                Err(Error::NotFound(sensor.address))
            }
        }
    }

    pub fn destroy(self) -> I {
        self.i2c
    }

    /// Scan the bus and report whether the sensor's address responded.
    pub fn is_present(&mut self) -> bool {
        detect(&mut self.i2c, self.address)
    }

    /// Reset the sensor's internal state machine, waiting until it is ready
    /// to receive another command.
    ///
    /// The sensor gives no response to the reset command, so success only
    /// means the command was acknowledged.
    pub fn soft_reset(&mut self, mut delay: impl DelayNs) -> Result<(), Error<I::Error>> {
        self.i2c.write(self.address, &SOFT_RESET_COMMAND)?;
        delay.delay_ms(SOFT_RESET_DELAY_MS);
        #[cfg(feature = "defmt")]
        defmt::debug!("SHT3x at {=u8:#x} reset", self.address);
        Ok(())
    }

    /// Measure temperature and humidity, rounding with the precision
    /// provided upon construction of the sensor struct.
    pub fn measure(&mut self, delay: impl DelayNs) -> Result<Reading, Error<I::Error>> {
        self.measure_with_precision(delay, self.config.precision)
    }

    /// Measure temperature and humidity, rounding with the given precision.
    ///
    /// Bus errors are returned as `Err`. A response that fails CRC
    /// validation is returned as `Ok(Reading::Invalid(..))`.
    pub fn measure_with_precision(
        &mut self,
        mut delay: impl DelayNs,
        precision: Precision,
    ) -> Result<Reading, Error<I::Error>> {
        self.i2c
            .write(self.address, &SINGLE_SHOT_HIGH_REPEATABILITY_COMMAND)?;
        delay.delay_ms(MEASUREMENT_DELAY_MS);
        self.i2c.read(self.address, &mut self.read_buffer)?;

        Ok(Reading::from_read_bytes(
            Unvalidated::new(self.read_buffer),
            precision,
        ))
    }
}
