// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F777 rover board.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use stm32f7xx_hal::{
    gpio::{gpioa, gpiob, gpiod, Alternate, ErasedPin, OpenDrain, Output, PushPull},
    pac,
    prelude::*,
};

/// All board pins. Construct this once at startup using:
///
/// ```text
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD, dp.GPIOE);
/// ```
pub struct BoardPins {
    pub leds: LedPins,
    pub usart1: Usart1Pins,
    pub i2c1: I2c1Pins,
    pub encoder: EncoderPins,
    pub pwm: PwmPins,
    pub dir: DirPins,
}

pub struct LedPins {
    pub red: OutPin,
    pub green: OutPin,
}

pub struct Usart1Pins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

/// IMU bus
pub struct I2c1Pins {
    pub scl: gpiob::PB8<Alternate<4, OpenDrain>>,
    pub sda: gpiob::PB9<Alternate<4, OpenDrain>>,
}

/// TIM2/TIM3 Quadrature Encoder Inputs (front left, front right)
pub struct EncoderPins {
    pub tim2_ch1: gpioa::PA0<Alternate<1>>,
    pub tim2_ch2: gpioa::PA1<Alternate<1>>,

    pub tim3_ch1: gpioa::PA6<Alternate<2>>,
    pub tim3_ch2: gpioa::PA7<Alternate<2>>,
}

/// TIM4_CH1..CH4, one per wheel in wheel-index order
pub struct PwmPins {
    pub fl: gpiod::PD12<Alternate<2>>,
    pub fr: gpiod::PD13<Alternate<2>>,
    pub rl: gpiod::PD14<Alternate<2>>,
    pub rr: gpiod::PD15<Alternate<2>>,
}

/// H-bridge direction inputs
pub struct DirPins {
    pub fl: OutPin,
    pub fr: OutPin,
    pub rl: OutPin,
    pub rr: OutPin,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpiob: pac::GPIOB, gpiod: pac::GPIOD, gpioe: pac::GPIOE) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpiod = gpiod.split();
        let gpioe = gpioe.split();

        Self {
            leds: LedPins {
                red: OutPin::new(gpiod.pd8.into_push_pull_output().erase()),
                green: OutPin::new(gpiod.pd10.into_push_pull_output().erase()),
            },

            usart1: Usart1Pins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },

            i2c1: I2c1Pins {
                scl: gpiob.pb8.into_alternate_open_drain::<4>(),
                sda: gpiob.pb9.into_alternate_open_drain::<4>(),
            },

            encoder: EncoderPins {
                tim2_ch1: gpioa.pa0.into_alternate::<1>(),
                tim2_ch2: gpioa.pa1.into_alternate::<1>(),
                tim3_ch1: gpioa.pa6.into_alternate::<2>(),
                tim3_ch2: gpioa.pa7.into_alternate::<2>(),
            },

            pwm: PwmPins {
                fl: gpiod.pd12.into_alternate::<2>(),
                fr: gpiod.pd13.into_alternate::<2>(),
                rl: gpiod.pd14.into_alternate::<2>(),
                rr: gpiod.pd15.into_alternate::<2>(),
            },

            dir: DirPins {
                fl: OutPin::new(gpioe.pe2.into_push_pull_output().erase()),
                fr: OutPin::new(gpioe.pe3.into_push_pull_output().erase()),
                rl: OutPin::new(gpioe.pe4.into_push_pull_output().erase()),
                rr: OutPin::new(gpioe.pe5.into_push_pull_output().erase()),
            },
        }
    }
}

/// Push-pull output exposed through the `embedded-hal` 1.0 `OutputPin` trait.
pub struct OutPin {
    pin: ErasedPin<Output<PushPull>>,
}

impl OutPin {
    pub fn new(pin: ErasedPin<Output<PushPull>>) -> Self {
        Self { pin }
    }
}

impl ErrorType for OutPin {
    type Error = Infallible;
}

impl OutputPin for OutPin {
    #[inline]
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.pin.set_low();
        Ok(())
    }

    #[inline]
    fn set_high(&mut self) -> Result<(), Infallible> {
        self.pin.set_high();
        Ok(())
    }
}
