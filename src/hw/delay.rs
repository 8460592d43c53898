// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Busy-wait delay counted in core cycles.
//!
//! Holds no peripheral, so the drive controller, the heading start-up and the main loop can each
//! own a copy.

use cortex_m::asm;
use embedded_hal::delay::DelayNs;

#[derive(Copy, Clone, Debug)]
pub struct CycleDelay {
    sysclk_hz: u32,
}

impl CycleDelay {
    pub fn new(sysclk_hz: u32) -> Self {
        Self { sysclk_hz }
    }
}

impl DelayNs for CycleDelay {
    fn delay_ns(&mut self, ns: u32) {
        let cycles = (ns as u64 * self.sysclk_hz as u64).div_ceil(1_000_000_000);
        asm::delay(cycles.min(u32::MAX as u64) as u32);
    }
}
