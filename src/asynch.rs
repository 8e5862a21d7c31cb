use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{I2c, SevenBitAddress};

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
pub async fn scan<I: I2c>(i2c: &mut I) -> AddressSet {
    let mut found = AddressSet::new();
    for address in SCAN_RANGE {
        if i2c.write(address, &[]).await.is_ok() {
            #[cfg(feature = "defmt")]
            defmt::debug!("I2C device found at {=u8:#x}", address);
            found.insert(address);
        }
    }
    found
}

/// Whether a device at `address` responds to a bus scan.
pub async fn detect<I: I2c>(i2c: &mut I, address: SevenBitAddress) -> bool {
    scan(i2c).await.contains(address)
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

    /// See [`blocking::SHT3x::init`](crate::blocking::SHT3x::init).
    pub async fn init(
        i2c: I,
        mut delay: impl DelayNs,
        config: Config,
    ) -> Result<Self, Error<I::Error>> {
        let mut sensor = Self::new(i2c, config);
        delay.delay_ms(STARTUP_DELAY_MS).await;

        if sensor.is_present().await {
            return Ok(sensor);
        }
        match sensor.soft_reset(&mut delay).await {
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
    pub async fn is_present(&mut self) -> bool {
        detect(&mut self.i2c, self.address).await
    }

    /// Reset the sensor's internal state machine, waiting until it is ready
    /// to receive another command.
    ///
    /// The sensor gives no response to the reset command, so success only
    /// means the command was acknowledged.
    pub async fn soft_reset(&mut self, mut delay: impl DelayNs) -> Result<(), Error<I::Error>> {
        self.i2c.write(self.address, &SOFT_RESET_COMMAND).await?;
        delay.delay_ms(SOFT_RESET_DELAY_MS).await;
        #[cfg(feature = "defmt")]
        defmt::debug!("SHT3x at {=u8:#x} reset", self.address);
        Ok(())
    }

    /// Measure temperature and humidity, rounding with the precision
    /// provided upon construction of the sensor struct.
    pub async fn measure(&mut self, delay: impl DelayNs) -> Result<Reading, Error<I::Error>> {
        let precision = self.config.precision;
        self.measure_with_precision(delay, precision).await
    }

    /// Measure temperature and humidity, rounding with the given precision.
    ///
    /// Bus errors are returned as `Err`. A response that fails CRC
    /// validation is returned as `Ok(Reading::Invalid(..))`.
    pub async fn measure_with_precision(
        &mut self,
        mut delay: impl DelayNs,
        precision: Precision,
    ) -> Result<Reading, Error<I::Error>> {
        self.i2c
            .write(self.address, &SINGLE_SHOT_HIGH_REPEATABILITY_COMMAND)
            .await?;
        delay.delay_ms(MEASUREMENT_DELAY_MS).await;
        self.i2c.read(self.address, &mut self.read_buffer).await?;

        Ok(Reading::from_read_bytes(
            Unvalidated::new(self.read_buffer),
            precision,
        ))
    }
}
