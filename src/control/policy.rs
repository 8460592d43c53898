// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Per-wheel speed control policies.
//!
//! The drive controller asks its policy for a signed duty each tick. The shipped firmware drives a
//! fixed duty in the commanded direction ([`OpenLoopFixedDuty`]). [`ClosedLoopPi`] closes the loop
//! on measured RPM where an encoder exists and is kept available as an alternative.

use crate::config::{PiGains, MAX_RPM, WHEEL_COUNT};
use crate::control::PiController;
use crate::motors::{Direction, WheelState};

/// Inputs shared by every wheel within one control tick.
#[derive(Copy, Clone, Debug)]
pub struct ControlContext {
    /// Time since the previous tick (s).
    pub dt_s: f32,
    /// Calibrated rear speed (RPM) reached at `calibration_duty`.
    pub reference_rear_speed: f32,
    pub calibration_duty: f32,
}

pub trait SpeedControlPolicy {
    /// Signed duty for `wheel`, expected in `[-1, 1]`.
    fn output(&mut self, wheel: &WheelState, ctx: &ControlContext) -> f32;

    /// Drop any accumulated state.
    fn reset(&mut self) {}
}

/// Fixed duty magnitude, sign of the wheel's reference. Zero reference gives zero.
#[derive(Copy, Clone, Debug)]
pub struct OpenLoopFixedDuty {
    duty: f32,
}

impl OpenLoopFixedDuty {
    pub fn new(duty: f32) -> Self {
        Self {
            duty: duty.clamp(0.0, 1.0),
        }
    }
}

impl SpeedControlPolicy for OpenLoopFixedDuty {
    fn output(&mut self, wheel: &WheelState, _ctx: &ControlContext) -> f32 {
        match Direction::of(wheel.reference_speed()) {
            Some(dir) => dir.sign() * self.duty,
            None => 0.0,
        }
    }
}

/// Feed-forward from the calibrated RPM-per-duty plus PI correction on measured RPM.
///
/// Wheels without an encoder have nothing to correct against and run on feed-forward alone.
#[derive(Copy, Clone, Debug)]
pub struct ClosedLoopPi {
    controllers: [PiController; WHEEL_COUNT],
}

impl ClosedLoopPi {
    pub fn new(gains: PiGains) -> Self {
        let pi = PiController::new(gains.kp, gains.ki)
            .with_integral_limits(-gains.integral_limit, gains.integral_limit);
        Self {
            controllers: [pi; WHEEL_COUNT],
        }
    }

    fn feed_forward(target_rpm: f32, ctx: &ControlContext) -> f32 {
        if ctx.calibration_duty <= 0.0 || ctx.reference_rear_speed <= 0.0 {
            return target_rpm / MAX_RPM;
        }
        let rpm_per_duty = ctx.reference_rear_speed / ctx.calibration_duty;
        (target_rpm / rpm_per_duty).clamp(-1.0, 1.0)
    }
}

impl Default for ClosedLoopPi {
    fn default() -> Self {
        Self::new(PiGains::default())
    }
}

impl SpeedControlPolicy for ClosedLoopPi {
    fn output(&mut self, wheel: &WheelState, ctx: &ControlContext) -> f32 {
        let reference = wheel.reference_speed();
        let Some(pi) = self.controllers.get_mut(wheel.index) else {
            return 0.0;
        };

        if reference == 0.0 {
            pi.reset();
            return 0.0;
        }

        let target_rpm = reference * MAX_RPM;
        let ff = Self::feed_forward(target_rpm, ctx);
        if wheel.has_encoder {
            pi.update(target_rpm, wheel.filtered_speed, ff, ctx.dt_s)
        } else {
            ff
        }
    }

    fn reset(&mut self) {
        for pi in self.controllers.iter_mut() {
            pi.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriveConfig;

    fn ctx() -> ControlContext {
        ControlContext {
            dt_s: 0.01,
            reference_rear_speed: 100.0,
            calibration_duty: 0.5,
        }
    }

    #[test]
    fn open_loop_follows_reference_sign_only() {
        let mut wheels = WheelState::from_config(&DriveConfig::default());
        let mut policy = OpenLoopFixedDuty::new(0.6);

        wheels[0].set_reference_speed(0.1);
        assert_eq!(policy.output(&wheels[0], &ctx()), 0.6);
        wheels[0].set_reference_speed(-0.9);
        assert_eq!(policy.output(&wheels[0], &ctx()), -0.6);
        wheels[0].set_reference_speed(0.0);
        assert_eq!(policy.output(&wheels[0], &ctx()), 0.0);
    }

    #[test]
    fn open_loop_ignores_measurement() {
        let mut wheels = WheelState::from_config(&DriveConfig::default());
        let mut policy = OpenLoopFixedDuty::new(0.6);
        wheels[1].set_reference_speed(0.5);
        wheels[1].reset_speed_to(180.0);
        assert_eq!(policy.output(&wheels[1], &ctx()), 0.6);
    }

    #[test]
    fn closed_loop_feed_forward_on_open_loop_wheel() {
        let mut wheels = WheelState::from_config(&DriveConfig::default());
        let mut policy = ClosedLoopPi::default();
        // 0.25 * 200 rpm = 50 rpm, at 200 rpm per unit duty
        wheels[2].set_reference_speed(0.25);
        assert!((policy.output(&wheels[2], &ctx()) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn closed_loop_pushes_harder_when_slow() {
        let mut wheels = WheelState::from_config(&DriveConfig::default());
        let mut policy = ClosedLoopPi::default();
        wheels[0].set_reference_speed(0.25);
        wheels[0].reset_speed_to(50.0);
        let on_target = policy.output(&wheels[0], &ctx());

        let mut policy = ClosedLoopPi::default();
        wheels[0].reset_speed_to(10.0);
        let slow = policy.output(&wheels[0], &ctx());
        assert!(slow > on_target);
        assert!(slow <= 1.0);
    }

    #[test]
    fn closed_loop_zero_reference_resets() {
        let mut wheels = WheelState::from_config(&DriveConfig::default());
        let mut policy = ClosedLoopPi::default();
        wheels[0].set_reference_speed(0.5);
        for _ in 0..20 {
            policy.output(&wheels[0], &ctx());
        }
        assert!(policy.controllers[0].integral() > 0.0);

        wheels[0].set_reference_speed(0.0);
        assert_eq!(policy.output(&wheels[0], &ctx()), 0.0);
        assert_eq!(policy.controllers[0].integral(), 0.0);
    }

    #[test]
    fn closed_loop_output_stays_in_range() {
        let mut wheels = WheelState::from_config(&DriveConfig::default());
        let mut policy = ClosedLoopPi::default();
        wheels[0].set_reference_speed(-1.0);
        for _ in 0..500 {
            let out = policy.output(&wheels[0], &ctx());
            assert!((-1.0..=1.0).contains(&out));
        }
    }
}
