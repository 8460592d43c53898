// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Rover Firmware
//!
//! This crate contains the firmware components for a four-wheel differential-drive rover, written
//! in Rust. The control code is target-agnostic; the STM32F777 board support and binary sit behind
//! the `board` feature.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`hw`] | Hardware boundary traits, clock, I2C framing and MCU-level wrappers |
//! | [`drivers`] | Device-level drivers (IMU, wheel H-bridges) |
//! | [`motors`] | Wheel state, speed estimation and the drive controller |
//! | [`control`] | Filters, PI, speed policies, calibration and heading |
//! | [`config`] | Tunables and configuration structs |
//!
//! ## Getting Started
//!
//! Run the host tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --features board
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod control;
pub mod drivers;
pub mod hw;
pub mod motors;
