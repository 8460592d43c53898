// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Algorithms
//!
//! Reusable building blocks for the wheel speed loops and heading estimate.
//!
//! ## Modules
//!
//! - [`filter`] - First-order IIR low-pass filter.
//! - [`pid`] - PI controller with anti-windup.
//! - [`policy`] - Per-wheel speed control policies (fixed duty, closed-loop PI).
//! - [`calibration`] - Rear-wheel reference speed calibration state machine.
//! - [`heading`] - Yaw integration from the gyro Z rate.

pub mod calibration;
pub mod filter;
pub mod heading;
pub mod pid;
pub mod policy;

pub use calibration::{AdaptiveCalibration, CalibrationPhase};
pub use filter::Iir1;
pub use heading::HeadingEstimator;
pub use pid::PiController;
pub use policy::{ClosedLoopPi, ControlContext, OpenLoopFixedDuty, SpeedControlPolicy};
