// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Snapshots of the quadrature counters, taken once per control tick.

use crate::hw::SensorReader;
use crate::motors::WheelState;

/// Moves the current counter reading of every encoder wheel into `prev_count` and stores a fresh
/// one in `raw_count`. Wheels without an encoder are left alone.
#[derive(Copy, Clone, Debug, Default)]
pub struct QuadratureEncoderSampler;

impl QuadratureEncoderSampler {
    pub fn sample<S: SensorReader>(&self, sensors: &mut S, wheels: &mut [WheelState]) {
        for wheel in wheels.iter_mut().filter(|w| w.has_encoder) {
            let count = sensors.read_encoder(wheel.index);
            wheel.prev_count = wheel.raw_count;
            wheel.raw_count = Some(count);
        }
    }

    /// Set previous and current to the same reading so the next delta starts from here.
    pub fn prime<S: SensorReader>(&self, sensors: &mut S, wheels: &mut [WheelState]) {
        for wheel in wheels.iter_mut().filter(|w| w.has_encoder) {
            let count = sensors.read_encoder(wheel.index);
            wheel.prev_count = Some(count);
            wheel.raw_count = Some(count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriveConfig;
    use crate::hw::mock::MockEncoders;

    #[test]
    fn sample_shifts_current_into_previous() {
        let mut enc = MockEncoders::new();
        let mut wheels = WheelState::from_config(&DriveConfig::default());
        let sampler = QuadratureEncoderSampler;

        enc.set(0, 100);
        enc.set(1, 200);
        sampler.sample(&mut enc, &mut wheels);
        assert_eq!(wheels[0].prev_count, None);
        assert_eq!(wheels[0].raw_count, Some(100));

        enc.set(0, 150);
        enc.set(1, 180);
        sampler.sample(&mut enc, &mut wheels);
        assert_eq!(wheels[0].prev_count, Some(100));
        assert_eq!(wheels[0].raw_count, Some(150));
        assert_eq!(wheels[1].prev_count, Some(200));
        assert_eq!(wheels[1].raw_count, Some(180));
    }

    #[test]
    fn wheels_without_encoder_are_untouched() {
        let mut enc = MockEncoders::new();
        enc.set(2, 500);
        enc.set(3, 600);
        let mut wheels = WheelState::from_config(&DriveConfig::default());

        QuadratureEncoderSampler.sample(&mut enc, &mut wheels);
        assert_eq!(wheels[2].raw_count, None);
        assert_eq!(wheels[3].prev_count, None);
    }

    #[test]
    fn prime_gives_zero_delta() {
        let mut enc = MockEncoders::new();
        enc.set(0, 4242);
        let mut wheels = WheelState::from_config(&DriveConfig::default());

        QuadratureEncoderSampler.prime(&mut enc, &mut wheels);
        assert_eq!(wheels[0].prev_count, Some(4242));
        assert_eq!(wheels[0].raw_count, Some(4242));
    }
}
