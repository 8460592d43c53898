// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Four-wheel drive controller.
//!
//! Owns every piece of mutable drive state and runs the periodic control tick:
//!
//! ```text
//! update_all_motors()
//!   ├─ QuadratureEncoderSampler::sample   (encoder wheels)
//!   ├─ SpeedEstimator::update             (all wheels, filtered)
//!   ├─ AdaptiveCalibration::step
//!   └─ speed_control(i) → set_motor_speed(i)   (per wheel, reversal protected)
//! ```
//!
//! Typical usage pattern:
//!
//! ```text
//! drive.init();
//! drive.move_forward(0.5);
//!
//! loop {
//!     drive.advance_system_time(1);
//!     drive.update_all_motors();
//!     delay.delay_ms(1);
//! }
//! ```

use embedded_hal::delay::DelayNs;
use log::{debug, info};
use micromath::F32Ext;

use crate::config::{CalibrationConfig, DriveConfig, WHEEL_COUNT};
use crate::control::{
    AdaptiveCalibration, CalibrationPhase, ControlContext, OpenLoopFixedDuty, SpeedControlPolicy,
};
use crate::hw::{HardwareActuator, SensorReader, SystemClock};
use crate::motors::wheel::position;
use crate::motors::{Direction, QuadratureEncoderSampler, SpeedEstimator, WheelState};

/// All mutable state of the drive subsystem.
#[derive(Copy, Clone, Debug)]
pub struct DriveControllerState {
    pub wheels: [WheelState; WHEEL_COUNT],
    pub calibration: AdaptiveCalibration,
    pub clock: SystemClock,
}

pub struct DriveController<A, S, D, P = OpenLoopFixedDuty> {
    actuator: A,
    sensors: S,
    delay: D,
    policy: P,

    config: DriveConfig,
    calibration_config: CalibrationConfig,
    sampler: QuadratureEncoderSampler,
    estimator: SpeedEstimator,
    state: DriveControllerState,
}

impl<A, S, D> DriveController<A, S, D, OpenLoopFixedDuty>
where
    A: HardwareActuator,
    S: SensorReader,
    D: DelayNs,
{
    /// Create a controller running the shipped fixed-duty policy.
    pub fn new(
        actuator: A,
        sensors: S,
        delay: D,
        config: DriveConfig,
        calibration: CalibrationConfig,
    ) -> Self {
        let policy = OpenLoopFixedDuty::new(config.fixed_duty);
        Self::with_policy(actuator, sensors, delay, policy, config, calibration)
    }
}

impl<A, S, D, P> DriveController<A, S, D, P>
where
    A: HardwareActuator,
    S: SensorReader,
    D: DelayNs,
    P: SpeedControlPolicy,
{
    pub fn with_policy(
        actuator: A,
        sensors: S,
        delay: D,
        policy: P,
        config: DriveConfig,
        calibration: CalibrationConfig,
    ) -> Self {
        let clock = SystemClock::new();
        Self {
            actuator,
            sensors,
            delay,
            policy,
            config,
            calibration_config: calibration,
            sampler: QuadratureEncoderSampler,
            estimator: SpeedEstimator::new(config.control_period_ms, clock.now_ms()),
            state: DriveControllerState {
                wheels: WheelState::from_config(&config),
                calibration: AdaptiveCalibration::new(calibration),
                clock,
            },
        }
    }

    /// Reset all drive state, park every wheel (forward, zero duty) and prime the encoders.
    pub fn init(&mut self) {
        self.state.wheels = WheelState::from_config(&self.config);
        self.state.calibration = AdaptiveCalibration::new(self.calibration_config);
        self.policy.reset();

        for i in 0..WHEEL_COUNT {
            self.actuator.set_direction(i, Direction::Forward);
            self.actuator.set_duty(i, 0.0);
        }

        self.init_encoders();
        self.estimator.restart(self.state.clock.now_ms());
        info!("drive: initialized at {} ms", self.state.clock.now_ms());
    }

    /// Take a baseline counter reading so the first speed estimate starts from zero.
    pub fn init_encoders(&mut self) {
        self.sampler.prime(&mut self.sensors, &mut self.state.wheels);
    }

    /// Advance the millisecond counter. Call once per main-loop iteration.
    #[inline]
    pub fn advance_system_time(&mut self, delta_ms: u32) {
        self.state.clock.advance(delta_ms);
    }

    #[inline]
    pub fn now_ms(&self) -> u32 {
        self.state.clock.now_ms()
    }

    /// Command one wheel directly. Clamped to `[-1, 1]`; an invalid index is ignored.
    pub fn set_speed_ref(&mut self, index: usize, value: f32) {
        if let Some(wheel) = self.state.wheels.get_mut(index) {
            wheel.set_reference_speed(value);
        }
    }

    /// Filtered speed of one wheel, `0.0` for an invalid index.
    pub fn get_motor_speed(&self, index: usize) -> f32 {
        self.state
            .wheels
            .get(index)
            .map_or(0.0, |w| w.filtered_speed)
    }

    pub fn move_forward(&mut self, speed: f32) {
        self.apply_pattern(speed, [1.0, 1.0, 1.0, 1.0]);
    }

    pub fn move_backward(&mut self, speed: f32) {
        self.apply_pattern(speed, [-1.0, -1.0, -1.0, -1.0]);
    }

    /// Spin in place counter-clockwise: left pair backward, right pair forward.
    pub fn turn_left(&mut self, speed: f32) {
        self.apply_pattern(speed, Self::turn_signs(-1.0));
    }

    /// Spin in place clockwise: left pair forward, right pair backward.
    pub fn turn_right(&mut self, speed: f32) {
        self.apply_pattern(speed, Self::turn_signs(1.0));
    }

    /// Zero every reference and cut the duty right away, without waiting for the next tick.
    pub fn stop(&mut self) {
        for wheel in self.state.wheels.iter_mut() {
            wheel.set_reference_speed(0.0);
        }
        for i in 0..WHEEL_COUNT {
            self.actuator.set_duty(i, 0.0);
        }
    }

    /// Run one control tick if a full control period has elapsed. Returns whether it ran.
    pub fn update_all_motors(&mut self) -> bool {
        let now = self.state.clock.now_ms();
        if !self.estimator.is_due(now) {
            return false;
        }
        let dt_ms = self.estimator.elapsed(now);
        // Open-loop estimates already follow the new command, so reversals are judged on the
        // speed from before this tick.
        let prior_speed: [f32; WHEEL_COUNT] =
            core::array::from_fn(|i| self.state.wheels[i].filtered_speed);

        self.sampler
            .sample(&mut self.sensors, &mut self.state.wheels);
        self.estimator.update(&mut self.state.wheels, now);

        if self.state.calibration.phase() == CalibrationPhase::Init {
            self.policy.reset();
        }
        let front = self.front_speed();
        self.state.calibration.step(now, front);

        let ctx = self.context(dt_ms);
        for i in 0..WHEEL_COUNT {
            self.speed_control_with(i, &ctx, prior_speed[i]);
        }
        true
    }

    /// Compute and apply the command for one wheel.
    pub fn speed_control(&mut self, index: usize) {
        let ctx = self.context(self.config.control_period_ms);
        let Some(speed) = self.state.wheels.get(index).map(|w| w.filtered_speed) else {
            return;
        };
        self.speed_control_with(index, &ctx, speed);
    }

    fn speed_control_with(&mut self, index: usize, ctx: &ControlContext, speed: f32) {
        let Some(wheel) = self.state.wheels.get(index) else {
            return;
        };

        let output = match self.state.calibration.phase() {
            CalibrationPhase::Calibrating => self.state.calibration.duty(),
            _ => self.policy.output(wheel, ctx),
        };
        self.drive_wheel(index, output.clamp(-1.0, 1.0), speed);
    }

    /// Drive one wheel at a signed duty.
    ///
    /// A direction change while the wheel is still turning faster than the reversal threshold is
    /// sequenced as: zero duty, coast delay, new direction, new duty.
    pub fn set_motor_speed(&mut self, index: usize, output: f32) {
        if let Some(speed) = self.state.wheels.get(index).map(|w| w.filtered_speed) {
            self.drive_wheel(index, output, speed);
        }
    }

    /// `speed` is the wheel speed the reversal decision is taken on.
    fn drive_wheel(&mut self, index: usize, output: f32, speed: f32) {
        let Some(wheel) = self.state.wheels.get_mut(index) else {
            return;
        };
        let output = if output.is_nan() {
            0.0
        } else {
            output.clamp(-1.0, 1.0)
        };

        if let Some(direction) = Direction::of(output) {
            if direction != wheel.last_direction {
                if speed.abs() > self.config.reversal_threshold {
                    debug!("drive: wheel {} coasting before reversal ({})", index, speed);
                    self.actuator.set_duty(index, 0.0);
                    self.delay.delay_ms(self.config.reversal_coast_ms);
                }
                self.actuator.set_direction(index, direction);
                wheel.last_direction = direction;
            }
        }

        self.actuator.set_duty(index, output.abs());
    }

    #[inline]
    pub fn calibration_phase(&self) -> CalibrationPhase {
        self.state.calibration.phase()
    }

    #[inline]
    pub fn reference_rear_speed(&self) -> f32 {
        self.state.calibration.reference_rear_speed()
    }

    #[inline]
    pub fn wheel(&self, index: usize) -> Option<&WheelState> {
        self.state.wheels.get(index)
    }

    fn apply_pattern(&mut self, speed: f32, signs: [f32; WHEEL_COUNT]) {
        let speed = if speed.is_nan() {
            0.0
        } else {
            speed.clamp(0.0, 1.0)
        };
        for (wheel, sign) in self.state.wheels.iter_mut().zip(signs) {
            wheel.set_reference_speed(sign * speed * wheel.calibration_factor);
        }
    }

    /// `left` is the sign of the left pair; the right pair gets the opposite.
    fn turn_signs(left: f32) -> [f32; WHEEL_COUNT] {
        core::array::from_fn(|i| if position::is_left(i) { left } else { -left })
    }

    /// Average speed magnitude of the encoder wheels.
    fn front_speed(&self) -> f32 {
        let (sum, n) = self
            .state
            .wheels
            .iter()
            .filter(|w| w.has_encoder)
            .fold((0.0f32, 0u32), |(s, n), w| (s + w.filtered_speed.abs(), n + 1));
        if n == 0 {
            0.0
        } else {
            sum / n as f32
        }
    }

    fn context(&self, dt_ms: u32) -> ControlContext {
        ControlContext {
            dt_s: dt_ms as f32 / 1000.0,
            reference_rear_speed: self.state.calibration.reference_rear_speed(),
            calibration_duty: self.state.calibration.duty(),
        }
    }
}
