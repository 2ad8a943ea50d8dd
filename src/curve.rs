//! Response curves mapping a sensed voltage to a distance.

use crate::Fixed;

/// Longest distance the sensor can resolve, in micrometers.
pub const MAX_DISTANCE_UM: i32 = 10_000;

/// Longest distance the sensor can resolve, in millimeters.
pub const MAX_DISTANCE_MM: i32 = 10;

const UM_PER_MM: Fixed = Fixed::lit("1000");

/// Maps a sensed voltage to a distance in micrometers.
///
/// Implementations must return a value within `[0, MAX_DISTANCE_UM]`; the
/// driver does not clamp on their behalf. A reading outside the calibrated
/// part of the curve means the target is outside the measurement range, not
/// that the hardware failed, so curves saturate instead of reporting errors.
///
/// The trait is implemented for plain `fn(Fixed) -> i32` functions, so a
/// curve calibrated for a different target material can be passed without
/// defining a new type:
///
/// ```
/// use proximity_sensors::{Config, Fixed, Resolution, VOLTAGE_DIVIDER_RATIO, VREF};
///
/// fn aluminium_target(voltage: Fixed) -> i32 {
///     // calibration for aluminium would go here
///     voltage.saturating_mul(Fixed::lit("877")).to_num::<i32>().clamp(0, 10_000)
/// }
///
/// let config = Config {
///     resolution: Resolution::Bits12,
///     vref: VREF,
///     divider_ratio: VOLTAGE_DIVIDER_RATIO,
///     curve: aluminium_target as fn(Fixed) -> i32,
/// };
/// ```
pub trait ResponseCurve {
    /// Evaluates the curve for `voltage`, in Q16.16 volts.
    fn distance_um(&self, voltage: Fixed) -> i32;
}

impl ResponseCurve for fn(Fixed) -> i32 {
    fn distance_um(&self, voltage: Fixed) -> i32 {
        self(voltage)
    }
}

/// Cubic polynomial response curve,
/// `f(v) = b3*v^3 + b2*v^2 + b1*v + b0` millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolynomialCurve {
    pub b0: Fixed,
    pub b1: Fixed,
    pub b2: Fixed,
    pub b3: Fixed,
}

impl PolynomialCurve {
    /// Regression coefficients for the standard steel target (R² = 0.999).
    pub const STANDARD_TARGET: Self = Self {
        b0: Fixed::lit("-0.9188"),
        b1: Fixed::lit("1.8001"),
        b2: Fixed::lit("-0.2552"),
        b3: Fixed::lit("0.0165"),
    };
}

impl Default for PolynomialCurve {
    fn default() -> Self {
        Self::STANDARD_TARGET
    }
}

impl ResponseCurve for PolynomialCurve {
    fn distance_um(&self, voltage: Fixed) -> i32 {
        // Horner form. Saturating ops keep the evaluation total for inputs
        // far outside the calibrated 0.4-11.4 V range.
        let mm = self
            .b3
            .saturating_mul(voltage)
            .saturating_add(self.b2)
            .saturating_mul(voltage)
            .saturating_add(self.b1)
            .saturating_mul(voltage)
            .saturating_add(self.b0);

        let um: i32 = mm.saturating_mul(UM_PER_MM).to_num();
        um.clamp(0, MAX_DISTANCE_UM)
    }
}

/// Evaluates the standard-target polynomial for `voltage`, in Q16.16 volts.
///
/// Standalone version of [`PolynomialCurve::STANDARD_TARGET`] so the default
/// curve can be composed or tested without a driver instance.
///
/// # Examples
///
/// ```
/// use proximity_sensors::{default_response_curve, Fixed};
///
/// // Below the calibrated range the polynomial is negative and clamps to 0.
/// assert_eq!(default_response_curve(Fixed::ZERO), 0);
/// ```
pub fn default_response_curve(voltage: Fixed) -> i32 {
    PolynomialCurve::STANDARD_TARGET.distance_um(voltage)
}
