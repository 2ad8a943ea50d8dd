//! Driver for the Contrinex DWAS509 analog inductive distance sensor.
//!
//! The sensor outputs 0.4-11.4 V proportional to the distance of a metal
//! target within its 0-10 mm range. An external resistive divider brings
//! that swing into the ADC input range; the driver scales a raw sample back
//! to the sensor voltage and runs it through a [response curve](ResponseCurve)
//! calibrated for the target material.

use crate::curve::{PolynomialCurve, ResponseCurve};
use crate::scale::{sample_to_voltage, Resolution};
use crate::Fixed;
use core::fmt;
use embedded_hal::adc::{Channel, OneShot};
use embedded_hal::blocking::delay::DelayUs;
use heapless::Vec;
use nb::block;

/// ADC reference voltage in volts.
pub const VREF: Fixed = Fixed::lit("3.3");

/// Ratio of the sensor output voltage to the voltage at the ADC pin.
///
/// `(R1 + R2) / R2` for a divider with R2 between sensor output and pin and
/// R1 between pin and ground; 3.45 matches the reference wiring of
/// 8.2 kOhm / 3.3 kOhm.
pub const VOLTAGE_DIVIDER_RATIO: Fixed = Fixed::lit("3.45");

/// Largest number of samples accepted by [`Dwas509::read_um_median`].
pub const MAX_MEDIAN_SAMPLES: usize = 31;

/// Configuration for a [`Dwas509`].
///
/// - `resolution`: the ADC resolution samples will be taken at
/// - `vref`: the ADC reference voltage in volts
/// - `divider_ratio`: the external voltage-divider ratio to undo
/// - `curve`: the [`ResponseCurve`] for the target material
///
/// The driver stores its own copy, so the caller's value can be reused or
/// discarded after construction. [`Config::default`] describes the reference
/// wiring: 12-bit sampling, [`VREF`], [`VOLTAGE_DIVIDER_RATIO`] and the
/// standard-target polynomial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config<Curve = PolynomialCurve> {
    pub resolution: Resolution,
    pub vref: Fixed,
    pub divider_ratio: Fixed,
    pub curve: Curve,
}

impl Default for Config<PolynomialCurve> {
    fn default() -> Self {
        Self {
            resolution: Resolution::Bits12,
            vref: VREF,
            divider_ratio: VOLTAGE_DIVIDER_RATIO,
            curve: PolynomialCurve::STANDARD_TARGET,
        }
    }
}

/// Errors returned by [`Dwas509`] reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// A median read was requested with zero samples, or with more than
    /// [`MAX_MEDIAN_SAMPLES`].
    InvalidSampleCount,
    /// The ADC peripheral reported a conversion fault.
    Adc(E),
}

impl<E> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidSampleCount => {
                write!(f, "sample count must be in 1..={MAX_MEDIAN_SAMPLES}")
            }
            Error::Adc(_) => write!(f, "ADC sampling failed"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Error<E> {}

type AdcError<Adc, ADC, Word, Pin> = <Adc as OneShot<ADC, Word, Pin>>::Error;

/// Driver for one DWAS509 sensor, owning the ADC pin it is wired to.
#[derive(Debug)]
pub struct Dwas509<Pin, Curve = PolynomialCurve> {
    pin: Pin,
    config: Config<Curve>,
}

impl<Pin, Curve: ResponseCurve> Dwas509<Pin, Curve> {
    /// Returns a driver for the sensor on `pin`, keeping its own copy of
    /// `config`.
    ///
    /// # Examples
    ///
    /// ```
    /// use proximity_sensors::{Config, Dwas509};
    /// # use embedded_hal_mock::adc::MockChan0;
    /// #
    /// # let pin = MockChan0 {};
    ///
    /// let sensor = Dwas509::new(pin, Config::default());
    /// ```
    pub fn new<ADC>(pin: Pin, config: Config<Curve>) -> Self
    where
        Pin: Channel<ADC>,
    {
        Self { pin, config }
    }

    /// Destroys the driver and returns the `Pin`.
    pub fn free(self) -> Pin {
        self.pin
    }

    /// Reads the distance to the target in micrometers.
    ///
    /// Takes one blocking sample from `adc`, scales it to the sensor voltage
    /// and evaluates the configured response curve. The default curve
    /// reports `0..=10000`.
    ///
    /// # Examples
    ///
    /// ```
    /// use proximity_sensors::{Config, Dwas509};
    /// # use embedded_hal_mock::adc::{Mock, MockChan0, Transaction};
    /// #
    /// # let expectations: [Transaction<u16>; 1] = [Transaction::read(0, 0)];
    /// # let mut adc = Mock::new(&expectations);
    /// # let pin = MockChan0 {};
    ///
    /// let mut sensor = Dwas509::new(pin, Config::default());
    ///
    /// // 0 V at the pin is below the calibrated range: clamped to zero.
    /// assert_eq!(sensor.read_um(&mut adc), Ok(0));
    /// ```
    pub fn read_um<Adc, ADC, Word>(
        &mut self,
        adc: &mut Adc,
    ) -> Result<i32, Error<AdcError<Adc, ADC, Word, Pin>>>
    where
        Word: Copy + Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
    {
        let sample = block!(adc.read(&mut self.pin)).map_err(Error::Adc)?;
        let voltage = sample_to_voltage(
            sample.into(),
            self.config.resolution,
            self.config.vref,
            self.config.divider_ratio,
        );

        Ok(self.config.curve.distance_um(voltage))
    }

    /// Reads the distance in micrometers, median-filtered over `samples`
    /// acquisitions to reject single-sample outliers.
    ///
    /// Waits `delay_us` microseconds between consecutive acquisitions. For
    /// an even `samples` the lower of the two middle readings is returned.
    /// The first sampling failure aborts the whole read; `samples` outside
    /// `1..=MAX_MEDIAN_SAMPLES` fails with [`Error::InvalidSampleCount`]
    /// before touching the ADC.
    pub fn read_um_median<Adc, ADC, Word, D>(
        &mut self,
        adc: &mut Adc,
        delay: &mut D,
        samples: u8,
        delay_us: u32,
    ) -> Result<i32, Error<AdcError<Adc, ADC, Word, Pin>>>
    where
        Word: Copy + Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
        D: DelayUs<u32>,
    {
        if samples == 0 || usize::from(samples) > MAX_MEDIAN_SAMPLES {
            return Err(Error::InvalidSampleCount);
        }

        let mut readings: Vec<i32, MAX_MEDIAN_SAMPLES> = Vec::new();

        for n in 0..samples {
            if n > 0 {
                delay.delay_us(delay_us);
            }

            let distance = self.read_um(adc)?;
            readings.push(distance).map_err(|_| Error::InvalidSampleCount)?;
        }

        readings.sort_unstable();
        Ok(readings[(readings.len() - 1) / 2])
    }

    /// Reads the distance in millimeters, truncating toward zero.
    pub fn read_mm<Adc, ADC, Word>(
        &mut self,
        adc: &mut Adc,
    ) -> Result<i32, Error<AdcError<Adc, ADC, Word, Pin>>>
    where
        Word: Copy + Into<u32>,
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, Word, Pin>,
    {
        Ok(self.read_um(adc)? / 1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::default_response_curve;
    use embedded_hal_mock::{
        adc::{Mock, MockChan0, MockChan1, Transaction},
        common::Generic,
        delay::MockNoop,
        MockError,
    };
    use std::io::ErrorKind;

    fn driver() -> Dwas509<MockChan0, PolynomialCurve> {
        let pin = MockChan0 {};
        Dwas509::new(pin, Config::default())
    }

    fn adc(expectations: &[Transaction<u16>]) -> Generic<Transaction<u16>> {
        Mock::new(expectations)
    }

    fn expected_um(sample: u16) -> i32 {
        let voltage = sample_to_voltage(
            u32::from(sample),
            Resolution::Bits12,
            VREF,
            VOLTAGE_DIVIDER_RATIO,
        );
        default_response_curve(voltage)
    }

    #[test]
    fn read_um_at_zero_scale() {
        let mut adc = adc(&[Transaction::read(0, 0)]);

        assert_eq!(driver().read_um(&mut adc), Ok(0));
    }

    #[test]
    fn read_um_matches_conversion_pipeline() {
        let mut adc = adc(&[Transaction::read(0, 2048)]);

        assert_eq!(driver().read_um(&mut adc), Ok(expected_um(2048)));
    }

    #[test]
    fn read_um_propagates_adc_error() {
        let mut adc =
            adc(&[Transaction::read(0, 0).with_error(MockError::Io(ErrorKind::InvalidData))]);

        assert_eq!(
            driver().read_um(&mut adc),
            Err(Error::Adc(MockError::Io(ErrorKind::InvalidData)))
        );
    }

    #[test]
    fn median_of_five_samples() {
        let samples: [u16; 5] = [300, 3500, 1400, 1400, 3900];
        let expectations = samples.map(|sample| Transaction::read(0, sample));
        let mut adc = adc(&expectations);

        let mut sorted = samples.map(expected_um);
        sorted.sort_unstable();

        assert_eq!(
            driver().read_um_median(&mut adc, &mut MockNoop::new(), 5, 1000),
            Ok(sorted[2])
        );
    }

    #[test]
    fn median_of_even_count_takes_lower_middle() {
        let samples: [u16; 4] = [2600, 1200, 2200, 1800];
        let expectations = samples.map(|sample| Transaction::read(0, sample));
        let mut adc = adc(&expectations);

        let mut sorted = samples.map(expected_um);
        sorted.sort_unstable();

        assert_eq!(
            driver().read_um_median(&mut adc, &mut MockNoop::new(), 4, 1000),
            Ok(sorted[1])
        );
    }

    #[test]
    fn median_with_zero_samples_takes_no_acquisition() {
        // The mock would panic on any unexpected read.
        let mut adc = adc(&[]);

        assert_eq!(
            driver().read_um_median(&mut adc, &mut MockNoop::new(), 0, 1000),
            Err(Error::InvalidSampleCount)
        );
    }

    #[test]
    fn median_with_too_many_samples() {
        let mut adc = adc(&[]);

        assert_eq!(
            driver().read_um_median(&mut adc, &mut MockNoop::new(), 32, 1000),
            Err(Error::InvalidSampleCount)
        );
    }

    #[test]
    fn median_aborts_on_first_sampling_failure() {
        let mut adc =
            adc(&[Transaction::read(0, 0).with_error(MockError::Io(ErrorKind::InvalidData))]);

        assert!(driver()
            .read_um_median(&mut adc, &mut MockNoop::new(), 5, 1000)
            .is_err());
    }

    #[test]
    fn read_mm_truncates_micrometers() {
        let mut um_adc = adc(&[Transaction::read(0, 2048)]);
        let mut mm_adc = adc(&[Transaction::read(0, 2048)]);

        let um = driver().read_um(&mut um_adc).unwrap();

        assert_eq!(driver().read_mm(&mut mm_adc), Ok(um / 1000));
    }

    #[test]
    fn config_is_copied_into_the_driver() {
        let config = Config::default();

        let _first = Dwas509::new(MockChan0 {}, config);
        let _second = Dwas509::new(MockChan1 {}, config);
    }
}
