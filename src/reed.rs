//! Driver for two-contact reed switch sensors.
//!
//! A reed switch closes under a magnetic field. Packages with both a
//! normally-closed and a normally-open contact expose each on its own GPIO
//! pin; with pull-up wiring (the reference default) a pin reads low while
//! its contact is closed.
//!
//! Mechanical contacts bounce, so levels are accepted only after a number
//! of agreeing polls spaced a debounce interval apart.

use core::fmt;
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::InputPin;

/// Default delay between debounce polls, in microseconds (20 ms).
pub const DEBOUNCE_INTERVAL_US: u32 = 20_000;

/// State of a single reed contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchState {
    Open,
    Closed,
}

impl SwitchState {
    // Pull-up wiring: a closed contact pulls the pin low.
    fn from_level(is_high: bool) -> Self {
        if is_high {
            SwitchState::Open
        } else {
            SwitchState::Closed
        }
    }
}

/// Debounce settings for a [`ReedSensor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debounce {
    /// Consecutive agreeing polls required to accept a level.
    pub stable_polls: u8,
    /// Delay between polls in microseconds.
    pub interval_us: u32,
    /// Poll budget after which an unsettled signal is reported as
    /// [`Error::Unstable`].
    pub max_polls: u8,
}

impl Default for Debounce {
    fn default() -> Self {
        Self {
            stable_polls: 2,
            interval_us: DEBOUNCE_INTERVAL_US,
            max_polls: 8,
        }
    }
}

/// Errors returned by [`ReedSensor`] reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// Reading the GPIO pin failed.
    Pin(E),
    /// The contact level did not settle within the poll budget.
    Unstable,
}

impl<E> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Pin(_) => write!(f, "reading the contact pin failed"),
            Error::Unstable => write!(f, "contact level did not settle"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Error<E> {}

/// Driver for one reed switch, owning the pins of both contacts.
#[derive(Debug)]
pub struct ReedSensor<Nc, No> {
    nc: Nc,
    no: No,
    debounce: Debounce,
}

impl<Nc: InputPin, No: InputPin> ReedSensor<Nc, No> {
    /// Returns a driver for the switch wired to the `nc` (normally-closed)
    /// and `no` (normally-open) pins.
    pub fn new(nc: Nc, no: No, debounce: Debounce) -> Self {
        Self { nc, no, debounce }
    }

    /// Destroys the driver and returns the pins as `(nc, no)`.
    pub fn free(self) -> (Nc, No) {
        (self.nc, self.no)
    }

    /// Reads the debounced state of the normally-closed contact.
    pub fn read_nc<D: DelayUs<u32>>(&self, delay: &mut D) -> Result<SwitchState, Error<Nc::Error>> {
        debounced_level(&self.nc, self.debounce, delay).map(SwitchState::from_level)
    }

    /// Reads the debounced state of the normally-open contact.
    pub fn read_no<D: DelayUs<u32>>(&self, delay: &mut D) -> Result<SwitchState, Error<No::Error>> {
        debounced_level(&self.no, self.debounce, delay).map(SwitchState::from_level)
    }
}

/// Polls `pin` until `stable_polls` consecutive reads agree. A level change
/// restarts the confirmation count; exceeding the poll budget means the
/// contact is still bouncing.
fn debounced_level<P: InputPin, D: DelayUs<u32>>(
    pin: &P,
    debounce: Debounce,
    delay: &mut D,
) -> Result<bool, Error<P::Error>> {
    let mut level = pin.is_high().map_err(Error::Pin)?;
    let mut stable: u8 = 1;
    let mut polls: u8 = 1;

    while stable < debounce.stable_polls {
        if polls >= debounce.max_polls {
            return Err(Error::Unstable);
        }

        delay.delay_us(debounce.interval_us);
        let next = pin.is_high().map_err(Error::Pin)?;

        if next == level {
            stable += 1;
        } else {
            level = next;
            stable = 1;
        }
        polls += 1;
    }

    Ok(level)
}
