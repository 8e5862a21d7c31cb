//! Sensor readings to celsius, fahrenheit and percent relative humidity.
//!
//! These functions are used when building a [`Measurement`] but are
//! provided here should you need to use them. (Note that the raw sensor
//! readings are available as fields of the [`Measurement`] struct.)
//!
//! All conversion formulas can be found in section 4.13 of the [datasheet].
//! None of them clamp their output: readings at the extremes of the raw
//! range produce values outside the calibrated range of the sensor, and
//! are returned as such.
//!
//! The conversions in the root of this module work with and return `f32`s.
//! If you prefer to work with fixed- rather than floating-point numbers,
//! use the `fixed` feature and the [`fixed_point`] submodule.
//!
//! [`Measurement`]: crate::common::Measurement
//! [datasheet]: https://sensirion.com/media/documents/213E6A3B/63A5A569/Datasheet_SHT3x_DIS.pdf

/// Convert the raw humidity reading to percent relative humidity.
pub fn humidity_reading_to_percent_rh(reading: u16) -> f32 {
    let s_rh: f32 = reading.into();
    100.0 * (s_rh / 65_535.0)
}

/// Convert the raw temperature reading to celsius.
pub fn temperature_reading_to_celsius(reading: u16) -> f32 {
    let s_t: f32 = reading.into();
    -45.0 + 175.0 * (s_t / 65_535.0)
}

/// Convert the raw temperature reading to fahrenheit.
pub fn temperature_reading_to_fahrenheit(reading: u16) -> f32 {
    let s_t: f32 = reading.into();
    -49.0 + 315.0 * (s_t / 65_535.0)
}

/// Celsius in `f64`, so that rounding is applied to the formula's value
/// rather than to an `f32` approximation of it.
pub(crate) fn temperature_reading_to_celsius_f64(reading: u16) -> f64 {
    let s_t: f64 = reading.into();
    -45.0 + 175.0 * (s_t / 65_535.0)
}

pub(crate) fn humidity_reading_to_percent_rh_f64(reading: u16) -> f64 {
    let s_rh: f64 = reading.into();
    100.0 * (s_rh / 65_535.0)
}

/// A converted value rounded to a fixed number of decimal places.
///
/// Rounding to zero places produces [`Rounded::Integer`], which displays
/// without a fractional part. Any other number of places produces
/// [`Rounded::Decimal`], which displays with exactly that many digits after
/// the decimal point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rounded {
    Integer(i32),
    Decimal { value: f32, decimals: u8 },
}

impl Rounded {
    pub fn as_f32(&self) -> f32 {
        match *self {
            Rounded::Integer(i) => i as f32,
            Rounded::Decimal { value, .. } => value,
        }
    }
}

impl core::fmt::Display for Rounded {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            Rounded::Integer(i) => write!(f, "{i}"),
            Rounded::Decimal { value, decimals } => {
                write!(f, "{:.*}", usize::from(decimals), value)
            }
        }
    }
}

/// Round `value` to `decimals` places, with ties rounded away from zero.
///
/// `f32::round` lives in `std`, so the rounding is done by hand here.
/// Precision beyond what an `f32` can carry (about 7 significant digits)
/// is not meaningful and `decimals` is capped at 9.
///
/// Rounding to zero places saturates at the bounds of `i32`, and NaN
/// rounds to 0.
pub fn round(value: f32, decimals: u8) -> Rounded {
    round_f64(value.into(), decimals)
}

pub(crate) fn round_f64(value: f64, decimals: u8) -> Rounded {
    if decimals == 0 {
        let rounded = round_half_away_from_zero(value);
        return Rounded::Integer(rounded.clamp(i32::MIN.into(), i32::MAX.into()) as i32);
    }

    let decimals = decimals.min(9);
    // `f64::powi` is also `std`-only.
    let scale = (0..decimals).fold(1.0_f64, |acc, _| acc * 10.0);
    let scaled = round_half_away_from_zero(value * scale);
    Rounded::Decimal {
        value: (scaled as f64 / scale) as f32,
        decimals,
    }
}

/// Float to integer `as` casts saturate, so out-of-range input cannot wrap.
fn round_half_away_from_zero(x: f64) -> i64 {
    if x >= 0.0 {
        (x + 0.5) as i64
    } else {
        (x - 0.5) as i64
    }
}

/// Fixed-point numeric conversions from sensor readings.
///
/// The functions in this module are the same as those in the parent
/// `conversions` module, except that they operate with fixed-point numbers
/// rather than floating-point numbers.
///
/// Part of the conversion formula involves converting the reading (a `u16`)
/// into a percentage of `u16::MAX` (between 0 and 1). By using a numeric
/// type with 16 bits for the fractional portion, we can avoid any potential
/// precision loss in the converted reading that may result from working
/// with `f32`s.
#[cfg(feature = "fixed")]
pub mod fixed_point {
    use fixed::types::{I16F16, U16F16};

    fn fraction_of_full_scale(reading: u16) -> I16F16 {
        let fraction: U16F16 = U16F16::from_num(reading) / U16F16::from_num(u16::MAX);
        I16F16::from_num(fraction)
    }

    /// Convert the raw humidity reading to percent relative humidity.
    pub fn humidity_reading_to_percent_rh(reading: u16) -> I16F16 {
        I16F16::from_num(100) * fraction_of_full_scale(reading)
    }

    /// Convert the raw temperature reading to celsius.
    pub fn temperature_reading_to_celsius(reading: u16) -> I16F16 {
        I16F16::from_num(-45) + I16F16::from_num(175) * fraction_of_full_scale(reading)
    }

    /// Convert the raw temperature reading to fahrenheit.
    pub fn temperature_reading_to_fahrenheit(reading: u16) -> I16F16 {
        I16F16::from_num(-49) + I16F16::from_num(315) * fraction_of_full_scale(reading)
    }

}
