// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Rear-wheel reference speed calibration.
//!
//! Only the front wheels carry encoders. With every wheel driven at a known duty, the front wheels'
//! steady-state speed is taken as the speed the rear wheels reach at that duty. The result is the
//! RPM-per-duty figure the closed-loop policy uses for its feed-forward term.
//!
//! ```text
//! Init ──(disabled)──────────────────────────────▶ Controlling
//!   └──(enabled)──▶ Calibrating ──(stable | timeout)──┘
//! ```

use log::info;
use micromath::F32Ext;

use crate::config::{CalibrationConfig, REAR_SPEED_MAX_RPM, REAR_SPEED_MIN_RPM};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CalibrationPhase {
    Init,
    Calibrating,
    Controlling,
}

/// Calibration state machine. Phases only move forward.
#[derive(Copy, Clone, Debug)]
pub struct AdaptiveCalibration {
    config: CalibrationConfig,
    phase: CalibrationPhase,
    start_time_ms: u32,
    stable_count: u32,
    speed_accumulator: f32,
    last_front_speed: f32,
    reference_rear_speed: f32,
}

impl AdaptiveCalibration {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            phase: CalibrationPhase::Init,
            start_time_ms: 0,
            stable_count: 0,
            speed_accumulator: 0.0,
            last_front_speed: 0.0,
            reference_rear_speed: config.default_rear_speed,
        }
    }

    #[inline]
    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    /// Calibrated rear speed (RPM) at the calibration duty.
    #[inline]
    pub fn reference_rear_speed(&self) -> f32 {
        self.reference_rear_speed
    }

    /// Duty every wheel is driven at while calibrating.
    #[inline]
    pub fn duty(&self) -> f32 {
        self.config.duty
    }

    #[inline]
    pub fn stable_count(&self) -> u32 {
        self.stable_count
    }

    /// Advance the state machine by one control tick.
    ///
    /// `front_speed` is the average speed magnitude of the encoder wheels (RPM). Returns the new
    /// phase when a transition happened.
    pub fn step(&mut self, now_ms: u32, front_speed: f32) -> Option<CalibrationPhase> {
        match self.phase {
            CalibrationPhase::Init => {
                self.clear_accumulators();
                self.last_front_speed = front_speed;
                if self.config.enabled {
                    self.start_time_ms = now_ms;
                    self.phase = CalibrationPhase::Calibrating;
                    info!("calibration: started at {} ms", now_ms);
                } else {
                    self.phase = CalibrationPhase::Controlling;
                    info!("calibration: bypassed");
                }
                Some(self.phase)
            }

            CalibrationPhase::Calibrating => {
                let elapsed = now_ms.wrapping_sub(self.start_time_ms);
                if elapsed < self.config.settle_ms {
                    self.last_front_speed = front_speed;
                    return None;
                }

                let change = (front_speed - self.last_front_speed).abs();
                self.last_front_speed = front_speed;
                if change < self.config.stability_rpm {
                    self.speed_accumulator += front_speed;
                    self.stable_count += 1;
                } else {
                    self.clear_accumulators();
                }

                if self.stable_count >= self.config.min_stable_count
                    || elapsed >= self.config.timeout_ms
                {
                    self.finish(elapsed);
                    return Some(self.phase);
                }
                None
            }

            CalibrationPhase::Controlling => None,
        }
    }

    fn finish(&mut self, elapsed_ms: u32) {
        if self.stable_count > 0 {
            let mean = self.speed_accumulator / self.stable_count as f32;
            if mean.is_finite() {
                self.reference_rear_speed = mean.clamp(REAR_SPEED_MIN_RPM, REAR_SPEED_MAX_RPM);
            }
        }
        info!(
            "calibration: done after {} ms, {} samples, rear reference {} rpm",
            elapsed_ms, self.stable_count, self.reference_rear_speed
        );
        self.phase = CalibrationPhase::Controlling;
    }

    fn clear_accumulators(&mut self) {
        self.stable_count = 0;
        self.speed_accumulator = 0.0;
    }
}
