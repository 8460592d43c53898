// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Status LED on any push-pull output.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Whether the LED is driven active-high or active-low on the board wiring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActiveLevel {
    High,
    Low,
}

/// LED abstraction that remembers its active level and last known state.
pub struct Led<PIN: OutputPin> {
    pin: PIN,
    active: ActiveLevel,
    is_on: bool,
}

impl<PIN: OutputPin> Led<PIN> {
    /// Create an LED wrapper, initializing it to OFF.
    pub fn new(pin: PIN, active: ActiveLevel) -> Self {
        let mut led = Self {
            pin,
            active,
            is_on: true,
        };
        led.off();
        led
    }

    pub fn active_high(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::High)
    }

    pub fn active_low(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    /// Drive the LED logically ON (true) or OFF (false).
    pub fn set(&mut self, on: bool) {
        let high = on == (self.active == ActiveLevel::High);
        if high {
            self.pin.set_high().ok();
        } else {
            self.pin.set_low().ok();
        }
        self.is_on = on;
    }

    #[inline]
    pub fn on(&mut self) {
        self.set(true);
    }

    #[inline]
    pub fn off(&mut self) {
        self.set(false);
    }

    pub fn toggle(&mut self) {
        self.set(!self.is_on);
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// One on/off cycle. Used by the fault loop.
    pub fn blink<D: DelayNs>(&mut self, delay: &mut D, on_ms: u32, off_ms: u32) {
        self.on();
        delay.delay_ms(on_ms);
        self.off();
        delay.delay_ms(off_ms);
    }

    pub fn free(self) -> PIN {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::mock::{delayed_ms, event_log, MockDelay};
    use core::convert::Infallible;
    use embedded_hal::digital;

    #[derive(Default)]
    struct Pin {
        writes: Vec<bool>,
    }

    impl digital::ErrorType for Pin {
        type Error = Infallible;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.writes.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.writes.push(true);
            Ok(())
        }
    }

    #[test]
    fn starts_off_at_the_right_level() {
        let led = Led::active_low(Pin::default());
        assert!(!led.is_on());
        assert_eq!(led.free().writes, vec![true]);

        let led = Led::active_high(Pin::default());
        assert_eq!(led.free().writes, vec![false]);
    }

    #[test]
    fn toggle_flips_state() {
        let mut led = Led::active_low(Pin::default());
        led.toggle();
        assert!(led.is_on());
        led.toggle();
        assert!(!led.is_on());
        assert_eq!(led.free().writes, vec![true, false, true]);
    }

    #[test]
    fn blink_waits_both_phases() {
        let log = event_log();
        let mut delay = MockDelay::new(&log);
        let mut led = Led::active_high(Pin::default());
        led.blink(&mut delay, 100, 400);
        assert!(!led.is_on());
        assert_eq!(delayed_ms(&log), 500);
        assert_eq!(led.free().writes, vec![false, true, false]);
    }
}
