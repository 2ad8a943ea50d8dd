//! Uniform read access to heterogeneous sensors.
//!
//! Application code that polls several sensors rarely wants to know which
//! driver produced a reading. Each adapter here wraps a driver together
//! with the peripherals it reads through and exposes the object-safe
//! [`Sensor`] trait, yielding a scaled [`Sample`]. Registration is the
//! application's business: keep the adapters wherever suits the firmware
//! and poll them through `&mut dyn Sensor`.

use crate::curve::ResponseCurve;
use crate::dwas509::Dwas509;
use crate::reed::{self, ReedSensor, SwitchState};
use core::fmt;
use core::marker::PhantomData;
use embedded_hal::adc::{Channel, OneShot};
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::InputPin;

/// Measurement units reported in a [`Sample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Unit {
    Meter,
    Bool,
}

/// One measurement: the physical value is `value * 10^scale` in `unit`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    pub value: i32,
    pub scale: i8,
    pub unit: Unit,
}

/// Error reported through the uniform read interface.
///
/// Driver-specific detail is deliberately erased to keep [`Sensor`]
/// object-safe; callers needing it should read the driver directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadingError {
    /// The underlying peripheral failed.
    Device,
    /// The signal did not settle within the debounce window.
    Unsettled,
}

impl fmt::Display for ReadingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadingError::Device => write!(f, "sensor peripheral failed"),
            ReadingError::Unsettled => write!(f, "sensor signal did not settle"),
        }
    }
}

impl core::error::Error for ReadingError {}

/// A device that can take one measurement per call.
///
/// Blocks until the reading is ready.
pub trait Sensor {
    fn measure(&mut self) -> Result<Sample, ReadingError>;
}

/// Exposes a [`Dwas509`] and its ADC as a distance [`Sensor`].
///
/// Reports micrometers as `(value, scale = -6, Unit::Meter)`.
pub struct DistanceSensor<Adc, ADC, Word, Pin, Curve> {
    adc: Adc,
    driver: Dwas509<Pin, Curve>,
    marker: PhantomData<fn() -> (ADC, Word)>,
}

impl<Adc, ADC, Word, Pin, Curve> DistanceSensor<Adc, ADC, Word, Pin, Curve> {
    pub fn new(adc: Adc, driver: Dwas509<Pin, Curve>) -> Self {
        Self {
            adc,
            driver,
            marker: PhantomData,
        }
    }

    /// Destroys the adapter and returns the ADC and the driver.
    pub fn free(self) -> (Adc, Dwas509<Pin, Curve>) {
        (self.adc, self.driver)
    }
}

impl<Adc, ADC, Word, Pin, Curve> Sensor for DistanceSensor<Adc, ADC, Word, Pin, Curve>
where
    Word: Copy + Into<u32>,
    Pin: Channel<ADC>,
    Adc: OneShot<ADC, Word, Pin>,
    Curve: ResponseCurve,
{
    fn measure(&mut self) -> Result<Sample, ReadingError> {
        let um = self
            .driver
            .read_um(&mut self.adc)
            .map_err(|_| ReadingError::Device)?;

        Ok(Sample {
            value: um,
            scale: -6,
            unit: Unit::Meter,
        })
    }
}

/// Selects which contact of a [`ReedSensor`] a [`ReedContact`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Contact {
    NormallyClosed,
    NormallyOpen,
}

/// Exposes one contact of a [`ReedSensor`] as a boolean [`Sensor`].
///
/// Reports `1` while the contact is closed, as `(value, scale = 0,
/// Unit::Bool)`.
pub struct ReedContact<Nc, No, D> {
    sensor: ReedSensor<Nc, No>,
    delay: D,
    contact: Contact,
}

impl<Nc, No, D> ReedContact<Nc, No, D> {
    pub fn new(sensor: ReedSensor<Nc, No>, delay: D, contact: Contact) -> Self {
        Self {
            sensor,
            delay,
            contact,
        }
    }

    /// Destroys the adapter and returns the driver and the delay source.
    pub fn free(self) -> (ReedSensor<Nc, No>, D) {
        (self.sensor, self.delay)
    }
}

fn reading_error<E>(error: reed::Error<E>) -> ReadingError {
    match error {
        reed::Error::Pin(_) => ReadingError::Device,
        reed::Error::Unstable => ReadingError::Unsettled,
    }
}

impl<Nc, No, D> Sensor for ReedContact<Nc, No, D>
where
    Nc: InputPin,
    No: InputPin,
    D: DelayUs<u32>,
{
    fn measure(&mut self) -> Result<Sample, ReadingError> {
        let state = match self.contact {
            Contact::NormallyClosed => self
                .sensor
                .read_nc(&mut self.delay)
                .map_err(reading_error)?,
            Contact::NormallyOpen => self
                .sensor
                .read_no(&mut self.delay)
                .map_err(reading_error)?,
        };

        Ok(Sample {
            value: i32::from(state == SwitchState::Closed),
            scale: 0,
            unit: Unit::Bool,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dwas509::Config;
    use crate::reed::Debounce;
    use embedded_hal_mock::{
        adc::{Mock, MockChan0, Transaction},
        delay::MockNoop,
        pin::{Mock as PinMock, State, Transaction as PinTransaction},
        MockError,
    };
    use std::io::ErrorKind;

    #[test]
    fn heterogeneous_sensors_read_uniformly() {
        let expectations: [Transaction<u16>; 1] = [Transaction::read(0, 0)];
        let adc = Mock::new(&expectations);
        let driver = Dwas509::new(MockChan0 {}, Config::default());
        let mut distance = DistanceSensor::new(adc, driver);

        let nc = PinMock::new(&[]);
        let no = PinMock::new(&[
            PinTransaction::get(State::Low),
            PinTransaction::get(State::Low),
        ]);
        let reed = ReedSensor::new(nc, no, Debounce::default());
        let mut contact = ReedContact::new(reed, MockNoop::new(), Contact::NormallyOpen);

        let sensors: [&mut dyn Sensor; 2] = [&mut distance, &mut contact];
        let samples: Vec<Sample> = sensors
            .into_iter()
            .map(|sensor| sensor.measure().unwrap())
            .collect();

        assert_eq!(
            samples[0],
            Sample {
                value: 0,
                scale: -6,
                unit: Unit::Meter
            }
        );
        assert_eq!(
            samples[1],
            Sample {
                value: 1,
                scale: 0,
                unit: Unit::Bool
            }
        );
    }

    #[test]
    fn device_faults_are_erased_to_reading_errors() {
        let expectations: [Transaction<u16>; 1] =
            [Transaction::read(0, 0).with_error(MockError::Io(ErrorKind::InvalidData))];
        let adc = Mock::new(&expectations);
        let driver = Dwas509::new(MockChan0 {}, Config::default());
        let mut distance = DistanceSensor::new(adc, driver);

        assert_eq!(distance.measure(), Err(ReadingError::Device));
    }

    #[test]
    fn open_contact_reads_zero() {
        let nc = PinMock::new(&[
            PinTransaction::get(State::High),
            PinTransaction::get(State::High),
        ]);
        let no = PinMock::new(&[]);
        let reed = ReedSensor::new(nc, no, Debounce::default());
        let mut contact = ReedContact::new(reed, MockNoop::new(), Contact::NormallyClosed);

        let sample = contact.measure().unwrap();
        assert_eq!(sample.value, 0);
        assert_eq!(sample.unit, Unit::Bool);
    }
}
