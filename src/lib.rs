//! Driver for the Sensirion SHT3x temperature and humidity sensors.
//!
//! The driver issues single-shot, high-repeatability measurements with
//! clock stretching enabled, validates both CRC-protected words of the
//! response and converts them to °C and %RH.
//!
//! ```rust,ignore
//! use sht3x_rjw::blocking::SHT3x;
//! use sht3x_rjw::common::Reading;
//!
//! let mut sensor = SHT3x::init(i2c, &mut delay, Default::default())?;
//! match sensor.measure(&mut delay)? {
//!     Reading::Valid(m) => println!("{} °C\t{} %RH", m.temperature, m.humidity),
//!     Reading::Invalid(failure) => println!("CRC mismatch in {failure}"),
//! }
//! ```
#![no_std]

#[cfg(feature = "async")]
pub mod asynch;
#[cfg(feature = "blocking")]
pub mod blocking;
pub mod common;
pub mod conversions;
pub mod crc;
pub mod error;
