//! Conversion of raw ADC samples into the voltage at the sensor output.

use crate::Fixed;
use core::fmt;

/// ADC resolutions supported by the conversion stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    Bits6,
    Bits8,
    Bits10,
    Bits12,
    Bits14,
    Bits16,
}

impl Resolution {
    /// Returns the sample width in bits.
    pub const fn bits(self) -> u32 {
        match self {
            Resolution::Bits6 => 6,
            Resolution::Bits8 => 8,
            Resolution::Bits10 => 10,
            Resolution::Bits12 => 12,
            Resolution::Bits14 => 14,
            Resolution::Bits16 => 16,
        }
    }

    /// Returns the number of distinct sample codes, `2^bits`.
    pub const fn max_sample(self) -> u32 {
        1 << self.bits()
    }
}

/// Error returned when a bit width does not name a supported [`Resolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidResolution(pub u8);

impl fmt::Display for InvalidResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit is not a supported ADC resolution", self.0)
    }
}

impl core::error::Error for InvalidResolution {}

impl TryFrom<u8> for Resolution {
    type Error = InvalidResolution;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            6 => Ok(Resolution::Bits6),
            8 => Ok(Resolution::Bits8),
            10 => Ok(Resolution::Bits10),
            12 => Ok(Resolution::Bits12),
            14 => Ok(Resolution::Bits14),
            16 => Ok(Resolution::Bits16),
            _ => Err(InvalidResolution(bits)),
        }
    }
}

/// Converts a raw ADC sample into the voltage at the sensor output.
///
/// `sample` must be below `resolution.max_sample()`. The voltage at the ADC
/// pin is `sample * vref / (max_sample - 1)`; multiplying by `divider_ratio`
/// undoes the external resistive divider between the sensor output and the
/// pin. Monotonic non-decreasing in `sample`.
pub fn sample_to_voltage(
    sample: u32,
    resolution: Resolution,
    vref: Fixed,
    divider_ratio: Fixed,
) -> Fixed {
    let max = i64::from(resolution.max_sample());
    // Q16.16 times an integer stays Q16.16; the 64-bit intermediate keeps
    // 16-bit samples from overflowing during the multiply.
    let at_pin = (i64::from(sample) * i64::from(vref.to_bits()) / (max - 1)) as i32;
    Fixed::from_bits(at_pin).saturating_mul(divider_ratio)
}
