// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! This module contains device-specific drivers that sit above the raw `hw/` layer and below the
//! application logic.
//!
//! ## Existing drivers
//!
//! - [`imu`] – I2C attitude module (gyro rates and fused Euler angles)
//! - [`wheel_driver`] – PWM + DIR H-bridge channels for the four wheels

pub mod imu;
pub mod wheel_driver;

pub use imu::Imu;
pub use wheel_driver::{WheelChannel, WheelDriver};
