// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Hardware boundary
//!
//! Traits the control code is written against, plus the MCU-level wrappers that implement them on
//! the STM32F7 board (behind the `board` feature).
//!
//! | Item | Purpose |
//! | ---- | ------- |
//! | [`HardwareActuator`] | Per-wheel PWM duty and direction pin writer |
//! | [`SensorReader`] | Quadrature counter snapshot per wheel |
//! | [`RateGyro`] | Gyro rate and Euler angle source |
//! | [`clock`] | Explicitly advanced millisecond counter |
//! | [`i2c`] | I2C error taxonomy and register framing |
//! | [`i2c_bus`] | `embedded-hal` 0.2 to 1.0 I2C bridge |
//! | [`led`] | Status LED |
//!
//! Board only: `encoder` (TIM2/TIM3 quadrature), `pwm` (TIM4 wheel PWM), `pins`, `usart` (debug
//! port and logger) and `delay`.

pub mod clock;
pub mod i2c;
pub mod i2c_bus;
pub mod led;

#[cfg(feature = "board")]
pub mod delay;
#[cfg(feature = "board")]
pub mod encoder;
#[cfg(feature = "board")]
pub mod pins;
#[cfg(feature = "board")]
pub mod pwm;
#[cfg(feature = "board")]
pub mod usart;

#[cfg(test)]
pub(crate) mod mock;

pub use clock::SystemClock;
pub use i2c::Error;
pub use led::Led;

use crate::motors::Direction;

/// Writes the drive outputs of one wheel.
pub trait HardwareActuator {
    /// `duty` is the normalized PWM duty in `[0, 1]`.
    fn set_duty(&mut self, wheel: usize, duty: f32);

    fn set_direction(&mut self, wheel: usize, direction: Direction);
}

/// Reads the free-running 16-bit quadrature counter of one wheel.
pub trait SensorReader {
    fn read_encoder(&mut self, wheel: usize) -> u16;
}

/// Angular rate and attitude source.
pub trait RateGyro {
    /// Bring the device up. Fails if it cannot be found on the bus.
    fn init(&mut self) -> Result<(), Error>;

    /// Rotation rate about the vertical axis (°/s).
    fn read_gyro_z_dps(&mut self) -> Result<f32, Error>;

    /// Attitude as `(pitch, roll, yaw)` in degrees.
    fn read_euler(&mut self) -> Result<(f32, f32, f32), Error>;
}
