#![no_main]
#![no_std]

use cortex_m_rt::entry;
use panic_halt as _;

use hal::{
    i2c::{BlockingI2c, Mode},
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use embedded_hal::delay::DelayNs;
use log::{error, info, LevelFilter};
use micromath::F32Ext;

use rover::config::{
    CalibrationConfig, DriveConfig, HeadingConfig, HEADING_PERIOD_MS, I2C_FREQUENCY_HZ,
    LOOP_PERIOD_MS, PWM_FREQUENCY_HZ, YAW_ORIGIN_SAMPLES, YAW_ORIGIN_SAMPLE_DELAY_MS,
};
use rover::control::HeadingEstimator;
use rover::drivers::{Imu, WheelChannel, WheelDriver};
use rover::hw::{
    delay::CycleDelay,
    encoder::{Encoder, FrontEncoders},
    i2c_bus::I2cBus,
    pins::BoardPins,
    pwm,
    usart::{Usart, UsartLogger},
    Led,
};
use rover::motors::DriveController;

static LOGGER: UsartLogger<pac::USART1> = UsartLogger::new(LevelFilter::Info);

/// Demo routine: drive straight, then spin a quarter turn, forever.
const LEG_MS: u32 = 2000;
const TURN_DEG: f32 = 90.0;
const CRUISE: f32 = 0.5;
const TURN: f32 = 0.3;

#[derive(Copy, Clone)]
enum Leg {
    Straight { since_ms: u32 },
    Turn { start_yaw: f32 },
}

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();
    let mut apb1 = rcc.apb1;

    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD, dp.GPIOE);
    let mut delay = CycleDelay::new(clocks.sysclk().raw());

    let mut led_red = Led::active_low(pins.leds.red);
    let mut led_green = Led::active_low(pins.leds.green);

    // USART1 (DBG)
    let usart_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let serial = Serial::new(dp.USART1, (pins.usart1.tx, pins.usart1.rx), &clocks, usart_cfg);
    let _ = LOGGER.install(Usart::new(serial));
    info!("rover: boot, sysclk {} Hz", clocks.sysclk().raw());

    // IMU on I2C1
    let i2c = BlockingI2c::i2c1(
        dp.I2C1,
        (pins.i2c1.scl, pins.i2c1.sda),
        Mode::standard(I2C_FREQUENCY_HZ.Hz()),
        &clocks,
        &mut apb1,
        10_000,
    );
    let mut heading = HeadingEstimator::new(Imu::new(I2cBus::new(i2c)), HeadingConfig::default());
    if !heading.init() {
        error!("rover: no IMU, halting");
        loop {
            led_red.blink(&mut delay, 100, 100);
        }
    }
    heading.capture_yaw_origin(&mut delay, YAW_ORIGIN_SAMPLES, YAW_ORIGIN_SAMPLE_DELAY_MS);

    // Wheels: PWM on TIM4, encoders on TIM2/TIM3. Right-side motors are mirrored.
    let [pwm_fl, pwm_fr, pwm_rl, pwm_rr] =
        pwm::tim4(dp.TIM4, pins.pwm, clocks.pclk1().raw(), PWM_FREQUENCY_HZ);
    let wheels = WheelDriver::new([
        WheelChannel::new(pwm_fl, pins.dir.fl),
        WheelChannel::new(pwm_fr, pins.dir.fr).inverted(),
        WheelChannel::new(pwm_rl, pins.dir.rl),
        WheelChannel::new(pwm_rr, pins.dir.rr).inverted(),
    ]);
    let encoders = FrontEncoders::new(Encoder::tim2(dp.TIM2), Encoder::tim3(dp.TIM3));

    let mut drive = DriveController::new(
        wheels,
        encoders,
        delay,
        DriveConfig::default(),
        CalibrationConfig::default(),
    );
    drive.init();

    let mut leg = Leg::Straight { since_ms: 0 };
    let mut last_heading_ms = 0u32;
    let mut last_report_ms = 0u32;

    loop {
        drive.advance_system_time(LOOP_PERIOD_MS);
        let now = drive.now_ms();

        if now.wrapping_sub(last_heading_ms) >= HEADING_PERIOD_MS {
            heading.update_yaw(now.wrapping_sub(last_heading_ms));
            last_heading_ms = now;
        }

        let yaw = heading.get_yaw_deg();
        leg = match leg {
            Leg::Straight { since_ms } if now.wrapping_sub(since_ms) >= LEG_MS => {
                drive.turn_right(TURN);
                Leg::Turn { start_yaw: yaw }
            }
            Leg::Straight { .. } => {
                drive.move_forward(CRUISE);
                leg
            }
            Leg::Turn { start_yaw } if (yaw - start_yaw).abs() >= TURN_DEG => {
                drive.move_forward(CRUISE);
                Leg::Straight { since_ms: now }
            }
            Leg::Turn { .. } => leg,
        };

        drive.update_all_motors();

        if now.wrapping_sub(last_report_ms) >= 1000 {
            last_report_ms = now;
            led_green.toggle();
            info!(
                "t={} ms yaw={} fl={} fr={} phase={:?}",
                now,
                yaw,
                drive.get_motor_speed(0),
                drive.get_motor_speed(1),
                drive.calibration_phase()
            );
        }

        delay.delay_ms(LOOP_PERIOD_MS);
    }
}
