// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Heading estimate from the gyro Z rate.
//!
//! The yaw angle is a pure software integral of the bias-corrected rate. Small corrected rates are
//! forced to zero so a stationary robot does not drift. A failed read skips the tick and holds the
//! previous heading.
//!
//! Typical usage pattern:
//!
//! ```text
//! if !heading.init() { halt(); }
//! loop {
//!     heading.update_yaw(20);
//!     let yaw = heading.get_yaw_deg();
//! }
//! ```

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};
use micromath::F32Ext;

use crate::config::HeadingConfig;
use crate::hw::{Error, RateGyro};

/// Wrap an angle into `[-180, 180)`.
pub fn wrap_180(deg: f32) -> f32 {
    let mut a = deg % 360.0;
    if a >= 180.0 {
        a -= 360.0;
    } else if a < -180.0 {
        a += 360.0;
    }
    a
}

pub struct HeadingEstimator<G: RateGyro> {
    gyro: G,
    config: HeadingConfig,
    yaw_deg: f32,
    yaw_origin_deg: Option<f32>,
}

impl<G: RateGyro> HeadingEstimator<G> {
    pub fn new(gyro: G, config: HeadingConfig) -> Self {
        Self {
            gyro,
            config,
            yaw_deg: 0.0,
            yaw_origin_deg: None,
        }
    }

    /// Bring up the gyro. `false` means the robot has no heading feedback and must not drive.
    pub fn init(&mut self) -> bool {
        match self.gyro.init() {
            Ok(()) => {
                info!("heading: gyro ready");
                true
            }
            Err(e) => {
                warn!("heading: gyro init failed: {:?}", e);
                false
            }
        }
    }

    /// Raw gyro Z rate (°/s), no bias or dead-zone applied.
    pub fn read_gyro_z_dps(&mut self) -> Result<f32, Error> {
        self.gyro.read_gyro_z_dps()
    }

    /// `(pitch, roll, yaw)` in degrees from the IMU's own fusion.
    pub fn read_euler(&mut self) -> Result<(f32, f32, f32), Error> {
        self.gyro.read_euler()
    }

    /// Integrate one tick of `dt_ms` milliseconds.
    pub fn update_yaw(&mut self, dt_ms: u32) {
        let rate = match self.gyro.read_gyro_z_dps() {
            Ok(rate) => rate,
            Err(e) => {
                debug!("heading: gyro read failed: {:?}", e);
                return;
            }
        };

        let mut corrected = rate - self.config.bias_dps;
        if corrected.abs() < self.config.dead_zone_dps {
            corrected = 0.0;
        }
        self.yaw_deg += corrected * dt_ms as f32 / 1000.0;
    }

    #[inline]
    pub fn get_yaw_deg(&self) -> f32 {
        self.yaw_deg
    }

    #[inline]
    pub fn reset_yaw(&mut self) {
        self.yaw_deg = 0.0;
    }

    /// Average `samples` Euler yaw readings, `delay_ms` apart, and keep the result as the origin
    /// for [`absolute_yaw_deg`](Self::absolute_yaw_deg). Returns `false` if no reading succeeded,
    /// in which case the previous origin is kept.
    pub fn capture_yaw_origin<D: DelayNs>(
        &mut self,
        delay: &mut D,
        samples: u32,
        delay_ms: u32,
    ) -> bool {
        let mut first: Option<f32> = None;
        let mut offset_sum = 0.0;
        let mut good = 0u32;

        for i in 0..samples {
            if i > 0 {
                delay.delay_ms(delay_ms);
            }
            let Ok((_, _, yaw)) = self.gyro.read_euler() else {
                continue;
            };
            // Average around the first sample so readings straddling ±180 do not cancel out.
            let base = *first.get_or_insert(yaw);
            offset_sum += wrap_180(yaw - base);
            good += 1;
        }

        match first {
            Some(base) if good > 0 => {
                let origin = wrap_180(base + offset_sum / good as f32);
                self.yaw_origin_deg = Some(origin);
                info!("heading: yaw origin {} deg from {} samples", origin, good);
                true
            }
            _ => {
                warn!("heading: no euler sample for yaw origin");
                false
            }
        }
    }

    #[inline]
    pub fn yaw_origin_deg(&self) -> Option<f32> {
        self.yaw_origin_deg
    }

    /// Euler yaw relative to the captured origin, in `[-180, 180)`.
    pub fn absolute_yaw_deg(&mut self) -> Result<f32, Error> {
        let (_, _, yaw) = self.gyro.read_euler()?;
        Ok(wrap_180(yaw - self.yaw_origin_deg.unwrap_or(0.0)))
    }

    /// Access the underlying gyro.
    #[inline]
    pub fn gyro_mut(&mut self) -> &mut G {
        &mut self.gyro
    }
}
