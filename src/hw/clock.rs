// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Millisecond system time.
//!
//! The counter is not driven by an interrupt. The main loop advances it once per iteration, and
//! everything time-gated compares against it with wrapping arithmetic.

/// Monotonic millisecond counter, wrapping at `u32::MAX`.
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock {
    now_ms: u32,
}

impl SystemClock {
    pub const fn new() -> Self {
        Self { now_ms: 0 }
    }

    #[inline]
    pub fn now_ms(&self) -> u32 {
        self.now_ms
    }

    #[inline]
    pub fn advance(&mut self, delta_ms: u32) {
        self.now_ms = self.now_ms.wrapping_add(delta_ms);
    }
}
