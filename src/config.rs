// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Physical constants and tuning parameters for the rover.
//!
//! Everything here is compile-time data. The `*Config` structs carry the shipped values through
//! `Default` and expose `with_*` builders so tests and alternative chassis can override single
//! fields.

// ** CHASSIS ** //

/// Number of driven wheels.
pub const WHEEL_COUNT: usize = 4;

/// Wheels fitted with a quadrature encoder (front pair).
pub const ENCODER_WHEELS: [bool; WHEEL_COUNT] = [true, true, false, false];

// ** ENCODER / SPEED ESTIMATION ** //

/// Encoder counts per motor revolution (11-line encoder, x4 quadrature decoding).
pub const ENCODER_PPR: f32 = 44.0;
/// Motor revolutions per output shaft revolution.
pub const GEAR_RATIO: f32 = 30.0;
/// Ceiling for a measured wheel speed (RPM).
pub const MAX_RPM: f32 = 200.0;
/// Measured speeds below this are reported as zero (RPM).
pub const MIN_RPM: f32 = 0.1;
/// Open-loop estimate for wheels without an encoder, as a fraction of the command.
pub const OPEN_LOOP_SPEED_GAIN: f32 = 0.9;
/// Smoothing coefficient of the per-wheel speed low-pass filter.
pub const SPEED_FILTER_ALPHA: f32 = 0.3;

// ** DRIVE CONTROL ** //

/// Period of `update_all_motors` (ms).
pub const CONTROL_PERIOD_MS: u32 = 10;
/// Duty magnitude emitted by the open-loop speed policy.
pub const FIXED_DUTY: f32 = 0.6;
/// Filtered speed magnitude above which a direction change coasts first.
pub const REVERSAL_SPEED_THRESHOLD: f32 = 0.3;
/// Coast time before a protected direction change (ms).
pub const REVERSAL_COAST_MS: u32 = 50;

// ** CALIBRATION ** //

/// Duty cycle applied to every wheel while calibrating.
pub const CALIBRATION_DUTY: f32 = 0.5;
/// Spin-up time during which calibration samples are ignored (ms).
pub const CALIBRATION_SETTLE_MS: u32 = 300;
/// Calibration gives up and keeps what it has after this long (ms).
pub const CALIBRATION_TIMEOUT_MS: u32 = 2000;
/// Maximum tick-to-tick change of the front average still counted as stable (RPM).
pub const CALIBRATION_STABILITY_RPM: f32 = 1.0;
/// Consecutive stable samples that end calibration.
pub const MIN_STABLE_COUNT: u32 = 10;
/// Bounds for the calibrated rear reference speed (RPM).
pub const REAR_SPEED_MIN_RPM: f32 = 5.0;
pub const REAR_SPEED_MAX_RPM: f32 = 150.0;
/// Rear reference speed used until a calibration run produces one (RPM).
pub const DEFAULT_REAR_SPEED_RPM: f32 = 100.0;

// ** SPEED PI ** //

pub const SPEED_KP: f32 = 0.004;
pub const SPEED_KI: f32 = 0.02;
/// Integrator clamp, in normalized duty.
pub const SPEED_INTEGRAL_LIMIT: f32 = 0.3;

// ** HEADING ** //

/// Gyro Z bias measured on the bench (°/s).
pub const GYRO_BIAS_DPS: f32 = 5.5;
/// Corrected rates smaller than this are treated as zero (°/s).
pub const GYRO_DEAD_ZONE_DPS: f32 = 0.15;

// ** IMU BUS ** //

/// 7-bit addresses probed in order at start-up.
pub const IMU_ADDRESSES: [u8; 3] = [0x50, 0x51, 0x52];
/// Gyro rate block (X, Y, Z).
pub const IMU_REG_GYRO: u8 = 0x20;
/// Euler angle block (pitch, roll, yaw).
pub const IMU_REG_EULER: u8 = 0x40;
/// Raw register units to °/s or degrees.
pub const IMU_SCALE: f32 = 1e-6;
/// Range of 7-bit addresses covered by the diagnostic bus scan.
pub const I2C_SCAN_FIRST: u8 = 0x08;
pub const I2C_SCAN_LAST: u8 = 0x77;

// ** BOARD ** //

/// Wheel PWM carrier frequency (Hz).
pub const PWM_FREQUENCY_HZ: u32 = 20_000;
/// I2C clock (Hz).
pub const I2C_FREQUENCY_HZ: u32 = 100_000;
/// Main loop tick (ms).
pub const LOOP_PERIOD_MS: u32 = 1;
/// Heading integration period (ms).
pub const HEADING_PERIOD_MS: u32 = 20;
/// Euler samples averaged into the yaw origin at start-up.
pub const YAW_ORIGIN_SAMPLES: u32 = 10;
pub const YAW_ORIGIN_SAMPLE_DELAY_MS: u32 = 10;

/// Parameters of the drive subsystem.
#[derive(Copy, Clone, Debug)]
pub struct DriveConfig {
    pub has_encoder: [bool; WHEEL_COUNT],
    pub calibration_factors: [f32; WHEEL_COUNT],
    pub control_period_ms: u32,
    pub fixed_duty: f32,
    pub reversal_threshold: f32,
    pub reversal_coast_ms: u32,
    pub filter_alpha: f32,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            has_encoder: ENCODER_WHEELS,
            calibration_factors: [1.0; WHEEL_COUNT],
            control_period_ms: CONTROL_PERIOD_MS,
            fixed_duty: FIXED_DUTY,
            reversal_threshold: REVERSAL_SPEED_THRESHOLD,
            reversal_coast_ms: REVERSAL_COAST_MS,
            filter_alpha: SPEED_FILTER_ALPHA,
        }
    }
}

impl DriveConfig {
    /// Per-wheel multipliers applied to every maneuver command.
    pub fn with_calibration_factors(mut self, factors: [f32; WHEEL_COUNT]) -> Self {
        self.calibration_factors = factors;
        self
    }

    pub fn with_filter_alpha(mut self, alpha: f32) -> Self {
        self.filter_alpha = alpha.clamp(0.0, 1.0);
        self
    }
}

/// Parameters of the rear-speed calibration run.
#[derive(Copy, Clone, Debug)]
pub struct CalibrationConfig {
    /// The shipped firmware skips calibration and goes straight to control.
    pub enabled: bool,
    pub duty: f32,
    pub settle_ms: u32,
    pub timeout_ms: u32,
    pub stability_rpm: f32,
    pub min_stable_count: u32,
    pub default_rear_speed: f32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            duty: CALIBRATION_DUTY,
            settle_ms: CALIBRATION_SETTLE_MS,
            timeout_ms: CALIBRATION_TIMEOUT_MS,
            stability_rpm: CALIBRATION_STABILITY_RPM,
            min_stable_count: MIN_STABLE_COUNT,
            default_rear_speed: DEFAULT_REAR_SPEED_RPM,
        }
    }
}

impl CalibrationConfig {
    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }
}

/// Gains of the closed-loop speed policy.
#[derive(Copy, Clone, Debug)]
pub struct PiGains {
    pub kp: f32,
    pub ki: f32,
    pub integral_limit: f32,
}

impl Default for PiGains {
    fn default() -> Self {
        Self {
            kp: SPEED_KP,
            ki: SPEED_KI,
            integral_limit: SPEED_INTEGRAL_LIMIT,
        }
    }
}

/// Parameters of the yaw integrator.
#[derive(Copy, Clone, Debug)]
pub struct HeadingConfig {
    pub bias_dps: f32,
    pub dead_zone_dps: f32,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            bias_dps: GYRO_BIAS_DPS,
            dead_zone_dps: GYRO_DEAD_ZONE_DPS,
        }
    }
}

impl HeadingConfig {
    pub fn with_bias_dps(mut self, bias: f32) -> Self {
        self.bias_dps = bias;
        self
    }
}
