// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Four-channel wheel PWM on TIM4 (PD12..PD15).
//!
//! The timer is set up once at register level in edge-aligned PWM mode 1 with preloaded compare
//! registers. Each [`PwmChannel`] only ever writes its own CCR, so the channels can be handed out
//! to independent owners.

use core::convert::Infallible;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use stm32f7xx_hal::pac;

use crate::config::WHEEL_COUNT;
use crate::hw::pins::PwmPins;

// OCxM = 110 (PWM mode 1), OCxPE = 1, for both channels of one CCMR register.
const CCMR_PWM1_PRELOAD: u32 = (0b110 << 4) | (1 << 3) | (0b110 << 12) | (1 << 11);
// CC1E | CC2E | CC3E | CC4E
const CCER_ALL_ENABLED: u32 = 0x1111;

/// Configure TIM4 for `freq_hz` given its kernel clock and return the four compare channels.
pub fn tim4(tim: pac::TIM4, _pins: PwmPins, timer_clk_hz: u32, freq_hz: u32) -> [PwmChannel; WHEEL_COUNT] {
    let rcc = unsafe { &*pac::RCC::ptr() };
    rcc.apb1enr.modify(|_, w| w.tim4en().set_bit());

    // Largest period that fits 16 bits, then the prescaler that hits the frequency.
    let ticks = (timer_clk_hz / freq_hz.max(1)).max(2);
    let psc = (ticks - 1) / 0x1_0000;
    let arr = (ticks / (psc + 1)).saturating_sub(1).clamp(1, 0xFFFF);

    tim.cr1.modify(|_, w| w.cen().clear_bit());
    tim.psc.write(|w| unsafe { w.bits(psc) });
    tim.arr.write(|w| unsafe { w.bits(arr) });

    tim.ccmr1_output().write(|w| unsafe { w.bits(CCMR_PWM1_PRELOAD) });
    tim.ccmr2_output().write(|w| unsafe { w.bits(CCMR_PWM1_PRELOAD) });

    tim.ccr1.write(|w| unsafe { w.bits(0) });
    tim.ccr2.write(|w| unsafe { w.bits(0) });
    tim.ccr3.write(|w| unsafe { w.bits(0) });
    tim.ccr4.write(|w| unsafe { w.bits(0) });

    tim.ccer.write(|w| unsafe { w.bits(CCER_ALL_ENABLED) });

    // Load PSC/ARR/CCR shadows, then start with auto-reload preload.
    tim.egr.write(|w| w.ug().set_bit());
    tim.cr1.modify(|_, w| w.arpe().set_bit().cen().set_bit());

    let max = arr as u16;
    core::array::from_fn(|ch| PwmChannel { ch: ch as u8, max })
}

/// One TIM4 compare channel.
pub struct PwmChannel {
    ch: u8,
    max: u16,
}

impl ErrorType for PwmChannel {
    type Error = Infallible;
}

impl SetDutyCycle for PwmChannel {
    #[inline]
    fn max_duty_cycle(&self) -> u16 {
        self.max
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        let tim = unsafe { &*pac::TIM4::ptr() };
        let duty = duty.min(self.max) as u32;
        match self.ch {
            0 => tim.ccr1.write(|w| unsafe { w.bits(duty) }),
            1 => tim.ccr2.write(|w| unsafe { w.bits(duty) }),
            2 => tim.ccr3.write(|w| unsafe { w.bits(duty) }),
            _ => tim.ccr4.write(|w| unsafe { w.bits(duty) }),
        }
        Ok(())
    }
}
