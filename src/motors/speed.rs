// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Wheel speed estimation from quadrature counter deltas.
//!
//! Encoder wheels are measured: the counter delta over the elapsed window is converted to
//! output-shaft RPM. Wheels without an encoder get an open-loop estimate derived from their
//! command. Both go through the wheel's low-pass filter.
//!
//! The measured sign is forced to agree with the commanded direction when a command is active.
//! The encoder wiring polarity is not known per chassis, so the command is trusted over the
//! counter. The price is that a stalled or disconnected encoder that still reports noise looks
//! like a normal reading in the commanded direction.

use micromath::F32Ext;

use crate::config::{ENCODER_PPR, GEAR_RATIO, MAX_RPM, MIN_RPM, OPEN_LOOP_SPEED_GAIN};
use crate::motors::WheelState;

const COUNTER_RANGE: i32 = 65536;
const HALF_RANGE: i32 = 32768;

/// Map a raw counter difference into `(-32768, 32768]`, keeping it congruent mod 65536.
///
/// Valid for any input in `[-65535, 65535]`.
#[inline]
pub fn wrap_delta(delta: i32) -> i32 {
    if delta > HALF_RANGE {
        delta - COUNTER_RANGE
    } else if delta <= -HALF_RANGE {
        delta + COUNTER_RANGE
    } else {
        delta
    }
}

/// Signed pulse count between two 16-bit counter snapshots.
#[inline]
pub fn counter_delta(previous: u16, current: u16) -> i32 {
    wrap_delta(current as i32 - previous as i32)
}

/// Unsigned output-shaft RPM for `pulses` counted over `elapsed_ms`.
pub fn pulses_to_rpm(pulses: i32, elapsed_ms: u32) -> f32 {
    if elapsed_ms == 0 {
        return 0.0;
    }
    let revs = (pulses as f32).abs() / (ENCODER_PPR * GEAR_RATIO);
    let minutes = elapsed_ms as f32 / 60_000.0;
    let rpm = (revs / minutes).clamp(0.0, MAX_RPM);
    if rpm < MIN_RPM {
        0.0
    } else {
        rpm
    }
}

/// Time-gated speed estimator for all wheels.
#[derive(Copy, Clone, Debug)]
pub struct SpeedEstimator {
    period_ms: u32,
    last_update_ms: u32,
}

impl SpeedEstimator {
    pub fn new(period_ms: u32, now_ms: u32) -> Self {
        Self {
            period_ms,
            last_update_ms: now_ms,
        }
    }

    /// True once a full period has passed since the last estimate.
    #[inline]
    pub fn is_due(&self, now_ms: u32) -> bool {
        now_ms.wrapping_sub(self.last_update_ms) >= self.period_ms
    }

    /// Milliseconds since the last estimate.
    #[inline]
    pub fn elapsed(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.last_update_ms)
    }

    /// Restart the window at `now_ms` without producing an estimate.
    pub fn restart(&mut self, now_ms: u32) {
        self.last_update_ms = now_ms;
    }

    /// Recompute every wheel's speed. Returns `false` without touching anything if the period
    /// has not elapsed.
    pub fn update(&mut self, wheels: &mut [WheelState], now_ms: u32) -> bool {
        let elapsed_ms = self.elapsed(now_ms);
        if elapsed_ms < self.period_ms.max(1) {
            return false;
        }
        self.last_update_ms = now_ms;

        for wheel in wheels.iter_mut() {
            let raw = if wheel.has_encoder {
                Self::measured_speed(wheel, elapsed_ms)
            } else {
                wheel.reference_speed() * OPEN_LOOP_SPEED_GAIN
            };
            wheel.push_raw_speed(raw);
        }
        true
    }

    fn measured_speed(wheel: &WheelState, elapsed_ms: u32) -> f32 {
        let delta = match (wheel.prev_count, wheel.raw_count) {
            (Some(prev), Some(cur)) => counter_delta(prev, cur),
            _ => 0,
        };

        let rpm = pulses_to_rpm(delta, elapsed_ms);
        if rpm == 0.0 {
            return 0.0;
        }

        let measured_negative = delta < 0;
        let reference = wheel.reference_speed();
        let negative = if reference != 0.0 {
            reference < 0.0
        } else {
            measured_negative
        };

        if negative {
            -rpm
        } else {
            rpm
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriveConfig;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn wrap_delta_is_congruent_and_in_range() {
        let mut d = -65535;
        while d <= 65535 {
            let w = wrap_delta(d);
            assert!(w > -32768 && w <= 32768, "{} -> {}", d, w);
            assert_eq!((w - d).rem_euclid(65536), 0, "{} -> {}", d, w);
            d += 1;
        }
    }

    #[test]
    fn counter_rollover_forward() {
        assert_eq!(counter_delta(65000, 100), 636);
    }

    #[test]
    fn counter_rollover_backward() {
        assert_eq!(counter_delta(100, 65000), -636);
        assert_eq!(counter_delta(500, 400), -100);
    }

    #[test]
    fn rpm_conversion() {
        // one output revolution in 600 ms is 100 RPM
        let pulses = (ENCODER_PPR * GEAR_RATIO) as i32;
        assert!(approx(pulses_to_rpm(pulses, 600), 100.0));
        assert!(approx(pulses_to_rpm(-pulses, 600), 100.0));
    }

    #[test]
    fn rpm_is_clamped_and_snapped() {
        assert_eq!(pulses_to_rpm(30_000, 10), MAX_RPM);
        // a single pulse over a second is ~0.045 RPM
        assert_eq!(pulses_to_rpm(1, 1000), 0.0);
        assert_eq!(pulses_to_rpm(0, 10), 0.0);
        assert_eq!(pulses_to_rpm(100, 0), 0.0);
    }

    #[test]
    fn update_is_gated_by_period() {
        let mut wheels = WheelState::from_config(&DriveConfig::default());
        let mut est = SpeedEstimator::new(10, 0);
        assert!(!est.update(&mut wheels, 9));
        assert!(est.update(&mut wheels, 10));
        assert!(!est.update(&mut wheels, 15));
        assert!(est.update(&mut wheels, 21));
    }

    #[test]
    fn measured_speed_follows_counter() {
        let mut wheels = WheelState::from_config(&DriveConfig::default().with_filter_alpha(1.0));
        wheels[0].prev_count = Some(1000);
        wheels[0].raw_count = Some(1022); // 22 pulses in 10 ms = 100 RPM
        wheels[1].prev_count = Some(1000);
        wheels[1].raw_count = Some(978);

        let mut est = SpeedEstimator::new(10, 0);
        assert!(est.update(&mut wheels, 10));
        assert!(approx(wheels[0].raw_speed, 100.0));
        assert!(approx(wheels[1].raw_speed, -100.0));
        assert!(approx(wheels[0].filtered_speed, 100.0));
    }

    #[test]
    fn sign_follows_command_when_encoder_disagrees() {
        let mut wheels = WheelState::from_config(&DriveConfig::default().with_filter_alpha(1.0));
        wheels[0].set_reference_speed(0.5);
        wheels[0].prev_count = Some(1000);
        wheels[0].raw_count = Some(978);
        wheels[1].set_reference_speed(-0.5);
        wheels[1].prev_count = Some(1000);
        wheels[1].raw_count = Some(1022);

        let mut est = SpeedEstimator::new(10, 0);
        est.update(&mut wheels, 10);
        assert!(wheels[0].raw_speed > 0.0);
        assert!(wheels[1].raw_speed < 0.0);
    }

    #[test]
    fn open_loop_wheels_use_command() {
        let mut wheels = WheelState::from_config(&DriveConfig::default().with_filter_alpha(1.0));
        wheels[2].set_reference_speed(0.5);
        wheels[3].set_reference_speed(-1.0);

        let mut est = SpeedEstimator::new(10, 0);
        est.update(&mut wheels, 10);
        assert!(approx(wheels[2].raw_speed, 0.45));
        assert!(approx(wheels[3].raw_speed, -0.9));
    }

    #[test]
    fn missing_sample_reads_as_stopped() {
        let mut wheels = WheelState::from_config(&DriveConfig::default());
        wheels[0].raw_count = Some(1234);
        let mut est = SpeedEstimator::new(10, 0);
        est.update(&mut wheels, 10);
        assert_eq!(wheels[0].raw_speed, 0.0);
    }

    #[test]
    fn speed_magnitude_is_never_negative_before_sign() {
        for pulses in [-32767, -500, -1, 0, 1, 500, 32768] {
            assert!(pulses_to_rpm(pulses, 10) >= 0.0);
        }
    }
}
