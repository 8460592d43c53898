// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Per-wheel drive state.

use crate::config::{DriveConfig, WHEEL_COUNT};
use crate::control::Iir1;

/// Logical drive direction of one wheel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Direction of a signed command. Zero has no direction.
    #[inline]
    pub fn of(value: f32) -> Option<Self> {
        if value > 0.0 {
            Some(Direction::Forward)
        } else if value < 0.0 {
            Some(Direction::Backward)
        } else {
            None
        }
    }

    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }
}

/// Wheel positions on the chassis. Left wheels are even, right wheels odd.
pub mod position {
    pub const FRONT_LEFT: usize = 0;
    pub const FRONT_RIGHT: usize = 1;
    pub const REAR_LEFT: usize = 2;
    pub const REAR_RIGHT: usize = 3;

    #[inline]
    pub fn is_left(index: usize) -> bool {
        index % 2 == 0
    }
}

/// Everything the control loop knows about one wheel.
///
/// Encoder wheels carry speeds in output-shaft RPM; the others carry the normalized open-loop
/// estimate.
#[derive(Copy, Clone, Debug)]
pub struct WheelState {
    pub index: usize,
    pub has_encoder: bool,
    pub calibration_factor: f32,
    pub last_direction: Direction,

    pub raw_count: Option<u16>,
    pub prev_count: Option<u16>,

    pub raw_speed: f32,
    pub filtered_speed: f32,
    reference_speed: f32,
    filter: Iir1,
}

impl WheelState {
    pub fn new(index: usize, has_encoder: bool, calibration_factor: f32, filter_alpha: f32) -> Self {
        Self {
            index,
            has_encoder,
            calibration_factor,
            last_direction: Direction::Forward,
            raw_count: None,
            prev_count: None,
            raw_speed: 0.0,
            filtered_speed: 0.0,
            reference_speed: 0.0,
            filter: Iir1::new(filter_alpha),
        }
    }

    /// All four wheels as laid out by `config`.
    pub fn from_config(config: &DriveConfig) -> [WheelState; WHEEL_COUNT] {
        core::array::from_fn(|i| {
            WheelState::new(
                i,
                config.has_encoder[i],
                config.calibration_factors[i],
                config.filter_alpha,
            )
        })
    }

    #[inline]
    pub fn reference_speed(&self) -> f32 {
        self.reference_speed
    }

    /// Store a commanded speed, clamped to `[-1, 1]`. NaN reads as stop.
    #[inline]
    pub fn set_reference_speed(&mut self, value: f32) {
        self.reference_speed = if value.is_nan() {
            0.0
        } else {
            value.clamp(-1.0, 1.0)
        };
    }

    /// Record a new raw speed and run it through the low-pass filter.
    #[inline]
    pub fn push_raw_speed(&mut self, raw: f32) {
        self.raw_speed = raw;
        self.filtered_speed = self.filter.update(raw);
    }

    /// Seed both speeds, bypassing the filter dynamics.
    pub fn reset_speed_to(&mut self, value: f32) {
        self.raw_speed = value;
        self.filter.reset_to(value);
        self.filtered_speed = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_speed_is_clamped_on_write() {
        let mut w = WheelState::new(0, true, 1.0, 0.3);
        w.set_reference_speed(1.7);
        assert_eq!(w.reference_speed(), 1.0);
        w.set_reference_speed(-4.0);
        assert_eq!(w.reference_speed(), -1.0);
        w.set_reference_speed(-0.25);
        assert_eq!(w.reference_speed(), -0.25);
        w.set_reference_speed(f32::NAN);
        assert_eq!(w.reference_speed(), 0.0);
    }

    #[test]
    fn filtered_speed_tracks_filter_output() {
        let mut w = WheelState::new(2, false, 1.0, 0.5);
        w.push_raw_speed(1.0);
        assert_eq!(w.raw_speed, 1.0);
        assert_eq!(w.filtered_speed, 0.5);
        w.push_raw_speed(1.0);
        assert_eq!(w.filtered_speed, 0.75);
    }

    #[test]
    fn layout_follows_config() {
        let wheels = WheelState::from_config(&DriveConfig::default());
        assert!(wheels[0].has_encoder && wheels[1].has_encoder);
        assert!(!wheels[2].has_encoder && !wheels[3].has_encoder);
        for (i, w) in wheels.iter().enumerate() {
            assert_eq!(w.index, i);
        }
        assert!(position::is_left(position::REAR_LEFT));
        assert!(!position::is_left(position::FRONT_RIGHT));
    }

    #[test]
    fn direction_of_signed_value() {
        assert_eq!(Direction::of(0.2), Some(Direction::Forward));
        assert_eq!(Direction::of(-0.2), Some(Direction::Backward));
        assert_eq!(Direction::of(0.0), None);
    }
}
