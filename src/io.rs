// src/io.rs

//! # Indicator and Fault Signal Interfaces
//!
//! Minimal output interfaces used by the regulator (fault buzzer) and the
//! step-response sequencer (run LED), plus an adapter that drives either
//! from an `embedded-hal` output pin.

use embedded_hal::digital::OutputPin;

/// Audible or visual fault indication, typically a buzzer.
///
/// Calls are fire-and-forget. How long an asserted fault stays audible is
/// up to the implementation.
pub trait FaultSignal {
    /// Asserts (`true`) or clears (`false`) the fault indication.
    fn signal(&mut self, on: bool);
}

/// On/off indicator, typically an LED.
pub trait Indicator {
    /// Turns the indicator on (`true`) or off (`false`).
    fn set(&mut self, on: bool);
}

impl FaultSignal for () {
    fn signal(&mut self, _on: bool) {}
}

impl Indicator for () {
    fn set(&mut self, _on: bool) {}
}

/// Whether the output is driven active-high or active-low on the board wiring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActiveLevel {
    /// Pin high means on.
    High,
    /// Pin low means on.
    Low,
}

/// Output pin wrapper that remembers its active level and last known state.
pub struct OutputIndicator<P: OutputPin> {
    pin: P,
    active: ActiveLevel,
    is_on: bool,
}

impl<P: OutputPin> OutputIndicator<P> {
    /// Create a wrapper, initializing the output to off.
    pub fn new(pin: P, active: ActiveLevel) -> Self {
        let mut indicator = Self {
            pin,
            active,
            is_on: true,
        };
        indicator.drive(false);
        indicator
    }

    /// Last state written to the pin.
    #[inline]
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Release the underlying pin.
    pub fn release(self) -> P {
        self.pin
    }

    fn drive(&mut self, on: bool) {
        if self.is_on == on {
            return;
        }
        // Pin errors are not actionable from the control loop.
        let _ = match (self.active, on) {
            (ActiveLevel::High, true) | (ActiveLevel::Low, false) => self.pin.set_high(),
            (ActiveLevel::High, false) | (ActiveLevel::Low, true) => self.pin.set_low(),
        };
        self.is_on = on;
    }
}

impl<P: OutputPin> Indicator for OutputIndicator<P> {
    fn set(&mut self, on: bool) {
        self.drive(on);
    }
}

impl<P: OutputPin> FaultSignal for OutputIndicator<P> {
    fn signal(&mut self, on: bool) {
        self.drive(on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_active_high_output() {
        let mut led = OutputIndicator::new(MockPin::new(), ActiveLevel::High);
        assert!(!led.is_on());
        assert_eq!(Some(false), led.pin.high);

        Indicator::set(&mut led, true);
        assert!(led.is_on());
        assert_eq!(Some(true), led.pin.high);
    }

    #[test]
    fn test_active_low_output() {
        let mut buzzer = OutputIndicator::new(MockPin::new(), ActiveLevel::Low);
        assert_eq!(Some(true), buzzer.pin.high);

        buzzer.signal(true);
        assert_eq!(Some(false), buzzer.pin.high);

        buzzer.signal(false);
        assert_eq!(Some(true), buzzer.release().high);
    }

    /// Repeated writes of the same state do not touch the pin.
    #[test]
    fn test_unchanged_state_skips_pin_write() {
        let mut led = OutputIndicator::new(MockPin::new(), ActiveLevel::High);
        Indicator::set(&mut led, true);
        Indicator::set(&mut led, true);
        Indicator::set(&mut led, true);
        assert_eq!(2, led.pin.writes);
    }
}
