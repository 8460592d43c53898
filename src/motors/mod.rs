// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Drive Subsystem
//!
//! Wheel state, speed measurement and the four-wheel drive controller. Everything here is written
//! against the traits in [`crate::hw`].
//!
//! ## Modules
//!
//! - [`wheel`] - Per-wheel state and direction.
//! - [`sampler`] - Quadrature counter snapshots.
//! - [`speed`] - Counter deltas to filtered RPM.
//! - [`drive`] - Maneuvers, the control tick and reversal-protected output.

pub mod drive;
pub mod sampler;
pub mod speed;
pub mod wheel;

pub use drive::{DriveController, DriveControllerState};
pub use sampler::QuadratureEncoderSampler;
pub use speed::SpeedEstimator;
pub use wheel::{Direction, WheelState};
