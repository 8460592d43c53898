// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! PI controller with anti-windup for wheel speed loops.
//!
//! Works in `no_std` and does not allocate memory.

/// Proportional-integral controller with a clamped integrator.
///
/// The integrator is clamped to `[int_min, int_max]` and additionally stops accumulating while the
/// output is saturated in the direction of the error (conditional integration).
#[derive(Copy, Clone, Debug)]
pub struct PiController {
    /// Proportional gain
    kp: f32,
    /// Integral gain
    ki: f32,

    /// Integrator state, already multiplied by `ki`
    integral: f32,

    /// Output clamp
    out_min: f32,
    out_max: f32,

    /// Integral anti-windup clamp
    int_min: f32,
    int_max: f32,
}

impl PiController {
    /// Create a new controller with output and integrator limited to `[-1, 1]`.
    pub fn new(kp: f32, ki: f32) -> Self {
        Self {
            kp,
            ki,
            integral: 0.0,
            out_min: -1.0,
            out_max: 1.0,
            int_min: -1.0,
            int_max: 1.0,
        }
    }

    /// Set output limits.
    pub fn with_output_limits(mut self, min: f32, max: f32) -> Self {
        self.out_min = min;
        self.out_max = max;
        self
    }

    /// Set integral limits for anti-windup.
    pub fn with_integral_limits(mut self, min: f32, max: f32) -> Self {
        self.int_min = min;
        self.int_max = max;
        self
    }

    /// Clear the integrator.
    pub fn reset(&mut self) {
        self.integral = 0.0;
    }

    #[inline]
    pub fn integral(&self) -> f32 {
        self.integral
    }

    /// Update the controller.
    ///
    /// `dt` is the timestep in seconds. `bias` is added to the output before clamping (feed-forward).
    pub fn update(&mut self, setpoint: f32, measurement: f32, bias: f32, dt: f32) -> f32 {
        let error = setpoint - measurement;
        let p = self.kp * error;

        let unclamped = bias + p + self.integral;
        let pushing_high = unclamped >= self.out_max && error > 0.0;
        let pushing_low = unclamped <= self.out_min && error < 0.0;
        if !pushing_high && !pushing_low {
            self.integral = (self.integral + self.ki * error * dt).clamp(self.int_min, self.int_max);
        }

        (bias + p + self.integral).clamp(self.out_min, self.out_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportional_only() {
        let mut pi = PiController::new(0.5, 0.0);
        assert_eq!(pi.update(1.0, 0.0, 0.0, 0.01), 0.5);
        assert_eq!(pi.update(0.0, 1.0, 0.0, 0.01), -0.5);
    }

    #[test]
    fn integrator_accumulates_and_resets() {
        let mut pi = PiController::new(0.0, 1.0);
        for _ in 0..10 {
            pi.update(1.0, 0.0, 0.0, 0.01);
        }
        assert!((pi.integral() - 0.1).abs() < 1e-5);
        pi.reset();
        assert_eq!(pi.integral(), 0.0);
    }

    #[test]
    fn integrator_is_clamped() {
        let mut pi = PiController::new(0.0, 10.0).with_integral_limits(-0.2, 0.2);
        for _ in 0..100 {
            pi.update(1.0, 0.0, 0.0, 0.1);
        }
        assert!(pi.integral() <= 0.2);
    }

    #[test]
    fn no_windup_while_saturated() {
        let mut pi = PiController::new(2.0, 1.0);
        for _ in 0..100 {
            assert_eq!(pi.update(1.0, 0.0, 0.0, 0.1), 1.0);
        }
        // P alone saturates, so the integrator never started
        assert_eq!(pi.integral(), 0.0);
    }

    #[test]
    fn bias_is_added_and_output_clamped() {
        let mut pi = PiController::new(0.0, 0.0).with_output_limits(-0.5, 0.5);
        assert_eq!(pi.update(0.0, 0.0, 0.3, 0.01), 0.3);
        assert_eq!(pi.update(0.0, 0.0, 0.9, 0.01), 0.5);
    }
}
