// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! First-order IIR low-pass filter.

/// One-pole low-pass: `y += alpha * (x - y)`.
///
/// `alpha = 1` passes the input through, `alpha = 0` freezes the output.
#[derive(Copy, Clone, Debug)]
pub struct Iir1 {
    alpha: f32,
    state: f32,
}

impl Iir1 {
    pub const fn new(alpha: f32) -> Self {
        Self { alpha, state: 0.0 }
    }

    /// Feed one sample and return the new output.
    #[inline]
    pub fn update(&mut self, input: f32) -> f32 {
        self.state += self.alpha * (input - self.state);
        self.state
    }

    #[inline]
    pub fn output(&self) -> f32 {
        self.state
    }

    /// Force the filter state, e.g. to seed it with a known speed.
    #[inline]
    pub fn reset_to(&mut self, value: f32) {
        self.state = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_response_converges_monotonically() {
        let mut f = Iir1::new(0.3);
        let mut prev = 0.0;
        for _ in 0..50 {
            let y = f.update(10.0);
            assert!(y >= prev && y <= 10.0);
            prev = y;
        }
        assert!((prev - 10.0).abs() < 1e-3);
    }

    #[test]
    fn first_sample_is_scaled_by_alpha() {
        let mut f = Iir1::new(0.25);
        assert_eq!(f.update(4.0), 1.0);
        assert_eq!(f.output(), 1.0);
    }

    #[test]
    fn unit_alpha_is_passthrough() {
        let mut f = Iir1::new(1.0);
        assert_eq!(f.update(-3.5), -3.5);
        assert_eq!(f.update(2.0), 2.0);
    }
}
