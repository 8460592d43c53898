// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Quadrature encoder support via STM32F7 timers in encoder mode.
//!
//! TIM2 (front left) and TIM3 (front right) count both edges of both channels. TIM2 is a 32-bit
//! timer but is reloaded at `0xFFFF` so both counters wrap the same way.

use stm32f7xx_hal::pac;

use crate::hw::SensorReader;
use crate::motors::wheel::position;

pub struct Encoder<TIM> {
    tim: TIM,
}

impl<TIM> Encoder<TIM> {
    /// Consume the wrapper and return the underlying timer peripheral.
    #[inline]
    pub fn free(self) -> TIM {
        self.tim
    }
}

impl Encoder<pac::TIM2> {
    pub fn tim2(tim2: pac::TIM2) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim2en().set_bit());

        let tim = tim2;

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        tim.arr.write(|w| w.bits(0xFFFF));

        // Slave mode: encoder mode 3 (count on both TI1 and TI2)
        tim.smcr.modify(|_, w| w.sms().bits(0b011));
        tim.ccmr1_input().modify(|_, w| w.cc1s().ti1().cc2s().ti2());
        tim.ccer.modify(|_, w| {
            w.cc1p()
                .clear_bit()
                .cc2p()
                .clear_bit()
                .cc1e()
                .set_bit()
                .cc2e()
                .set_bit()
        });

        tim.cnt.write(|w| w.bits(0));
        tim.cr1.modify(|_, w| w.cen().set_bit());

        Self { tim }
    }

    /// Low 16 bits of the counter.
    #[inline]
    pub fn count(&self) -> u16 {
        self.tim.cnt.read().cnt().bits() as u16
    }
}

impl Encoder<pac::TIM3> {
    pub fn tim3(tim3: pac::TIM3) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim3en().set_bit());

        let tim = tim3;

        tim.cr1.modify(|_, w| w.cen().clear_bit());
        tim.arr.write(|w| unsafe { w.bits(0xFFFF) });
        tim.smcr.modify(|_, w| w.sms().bits(0b011));
        tim.ccmr1_input().modify(|_, w| w.cc1s().ti1().cc2s().ti2());
        tim.ccer.modify(|_, w| {
            w.cc1p()
                .clear_bit()
                .cc2p()
                .clear_bit()
                .cc1e()
                .set_bit()
                .cc2e()
                .set_bit()
        });
        tim.cnt.write(|w| unsafe { w.bits(0) });
        tim.cr1.modify(|_, w| w.cen().set_bit());

        Self { tim }
    }

    #[inline]
    pub fn count(&self) -> u16 {
        self.tim.cnt.read().cnt().bits()
    }
}

/// The two front-wheel encoders as a [`SensorReader`]. Other wheels read as zero.
pub struct FrontEncoders {
    left: Encoder<pac::TIM2>,
    right: Encoder<pac::TIM3>,
}

impl FrontEncoders {
    pub fn new(left: Encoder<pac::TIM2>, right: Encoder<pac::TIM3>) -> Self {
        Self { left, right }
    }
}

impl SensorReader for FrontEncoders {
    fn read_encoder(&mut self, wheel: usize) -> u16 {
        match wheel {
            position::FRONT_LEFT => self.left.count(),
            position::FRONT_RIGHT => self.right.count(),
            _ => 0,
        }
    }
}
