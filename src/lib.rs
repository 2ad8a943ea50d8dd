#![cfg_attr(not(test), no_std)]

//! Drivers for two proximity sensors: the Contrinex DWAS509 analog
//! inductive distance sensor and two-contact reed switches.
//!
//! The DWAS509 outputs a voltage proportional to the distance of a metal
//! target within 0-10 mm. [`Dwas509`] samples it through any
//! [`embedded-hal`](embedded_hal) ADC, undoes the board's voltage divider
//! and evaluates a [`ResponseCurve`] calibrated for the target material,
//! all in Q16.16 fixed-point arithmetic so no FPU is needed.
//! [`reed::ReedSensor`] reads both contacts of a reed switch with polled
//! debouncing, and the [`sensor`] module lets application code poll both
//! device types through one trait.
//!
//! # Examples
//!
//! ```
//! use proximity_sensors::{Config, Dwas509};
//! # use embedded_hal_mock::adc::{Mock, MockChan0, Transaction};
//! #
//! # let expectations: [Transaction<u16>; 1] = [Transaction::read(0, 0)];
//! # let mut adc = Mock::new(&expectations);
//! # let pin = MockChan0 {};
//!
//! let mut sensor = Dwas509::new(pin, Config::default());
//!
//! // 0 V at the pin is below the calibrated range: clamped to zero.
//! assert_eq!(sensor.read_um(&mut adc), Ok(0));
//! ```

pub mod curve;
pub mod dwas509;
pub mod reed;
pub mod scale;
pub mod sensor;

pub use curve::{
    default_response_curve, PolynomialCurve, ResponseCurve, MAX_DISTANCE_MM, MAX_DISTANCE_UM,
};
pub use dwas509::{Config, Dwas509, Error, MAX_MEDIAN_SAMPLES, VOLTAGE_DIVIDER_RATIO, VREF};
pub use reed::{Debounce, ReedSensor, SwitchState};
pub use scale::{sample_to_voltage, InvalidResolution, Resolution};
pub use sensor::{Contact, DistanceSensor, ReadingError, ReedContact, Sample, Sensor, Unit};

/// Q16.16 signed fixed-point number, the crate-wide type for voltages and
/// fixed-point millimeter distances.
///
/// Multiplying two values runs through a 64-bit intermediate and an
/// arithmetic right shift by 16, so products of physically plausible
/// magnitudes cannot overflow the 32-bit representation.
pub type Fixed = fixed::types::I16F16;
