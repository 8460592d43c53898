// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! PWM + DIR motor driver channels for the four wheels.
//!
//! Each wheel's H-bridge takes a PWM input for speed and a direction input. Mirrored motors on the
//! right side are handled with a per-wheel direction inversion instead of rewiring.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::config::WHEEL_COUNT;
use crate::hw::HardwareActuator;
use crate::motors::Direction;

/// One wheel's PWM channel and direction pin.
pub struct WheelChannel<P, D> {
    pub pwm: P,
    pub dir: D,
    /// Drive the direction pin low for `Forward`.
    pub inverted: bool,
}

impl<P, D> WheelChannel<P, D> {
    pub fn new(pwm: P, dir: D) -> Self {
        Self {
            pwm,
            dir,
            inverted: false,
        }
    }

    pub fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }
}

pub struct WheelDriver<P, D> {
    channels: [WheelChannel<P, D>; WHEEL_COUNT],
}

impl<P, D> WheelDriver<P, D>
where
    P: SetDutyCycle,
    D: OutputPin,
{
    pub fn new(channels: [WheelChannel<P, D>; WHEEL_COUNT]) -> Self {
        Self { channels }
    }

    pub fn free(self) -> [WheelChannel<P, D>; WHEEL_COUNT] {
        self.channels
    }
}

impl<P, D> HardwareActuator for WheelDriver<P, D>
where
    P: SetDutyCycle,
    D: OutputPin,
{
    fn set_duty(&mut self, wheel: usize, duty: f32) {
        let Some(ch) = self.channels.get_mut(wheel) else {
            return;
        };
        let max = ch.pwm.max_duty_cycle();
        let ticks = (duty.clamp(0.0, 1.0) * max as f32) as u16;
        ch.pwm.set_duty_cycle(ticks.min(max)).ok();
    }

    fn set_direction(&mut self, wheel: usize, direction: Direction) {
        let Some(ch) = self.channels.get_mut(wheel) else {
            return;
        };
        let high = (direction == Direction::Forward) != ch.inverted;
        if high {
            ch.dir.set_high().ok();
        } else {
            ch.dir.set_low().ok();
        }
    }
}
