// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

// This file is only compiled during tests

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self, ErrorKind, NoAcknowledgeSource, Operation};

use crate::config::WHEEL_COUNT;
use crate::hw::{Error, HardwareActuator, RateGyro, SensorReader};
use crate::motors::Direction;

/// Everything the drive code did to the outside world, in order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Event {
    Duty(usize, f32),
    Direction(usize, Direction),
    DelayNs(u32),
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub struct MockActuator {
    log: EventLog,
}

impl MockActuator {
    pub fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

impl HardwareActuator for MockActuator {
    fn set_duty(&mut self, wheel: usize, duty: f32) {
        self.log.borrow_mut().push(Event::Duty(wheel, duty));
    }

    fn set_direction(&mut self, wheel: usize, direction: Direction) {
        self.log.borrow_mut().push(Event::Direction(wheel, direction));
    }
}

pub struct MockDelay {
    log: EventLog,
}

impl MockDelay {
    pub fn new(log: &EventLog) -> Self {
        Self { log: log.clone() }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().push(Event::DelayNs(ns));
    }

    // One event per call instead of the default 1 ms chunks.
    fn delay_ms(&mut self, ms: u32) {
        self.delay_ns(ms.saturating_mul(1_000_000));
    }
}

/// Total busy-wait time recorded in `log`, in ms.
pub fn delayed_ms(log: &EventLog) -> u64 {
    log.borrow()
        .iter()
        .map(|e| match e {
            Event::DelayNs(ns) => *ns as u64,
            _ => 0,
        })
        .sum::<u64>()
        / 1_000_000
}

/// Encoder counters the test can move while the controller owns the reader.
#[derive(Clone, Default)]
pub struct MockEncoders {
    counts: Rc<RefCell<[u16; WHEEL_COUNT]>>,
}

impl MockEncoders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, wheel: usize, count: u16) {
        self.counts.borrow_mut()[wheel] = count;
    }

    /// Advance a counter by a signed step, wrapping like the hardware register.
    pub fn step(&self, wheel: usize, delta: i32) {
        let mut counts = self.counts.borrow_mut();
        counts[wheel] = counts[wheel].wrapping_add(delta as u16);
    }
}

impl SensorReader for MockEncoders {
    fn read_encoder(&mut self, wheel: usize) -> u16 {
        self.counts.borrow()[wheel]
    }
}

/// Gyro returning whatever the test scripts.
pub struct MockGyro {
    pub present: bool,
    pub rate_dps: Result<f32, Error>,
    pub euler: VecDeque<Result<(f32, f32, f32), Error>>,
}

impl MockGyro {
    pub fn with_rate(rate_dps: f32) -> Self {
        Self {
            present: true,
            rate_dps: Ok(rate_dps),
            euler: VecDeque::new(),
        }
    }
}

impl RateGyro for MockGyro {
    fn init(&mut self) -> Result<(), Error> {
        if self.present {
            Ok(())
        } else {
            Err(Error::DeviceNotFound)
        }
    }

    fn read_gyro_z_dps(&mut self) -> Result<f32, Error> {
        self.rate_dps
    }

    fn read_euler(&mut self) -> Result<(f32, f32, f32), Error> {
        self.euler.pop_front().unwrap_or(Err(Error::I2cTimeout))
    }
}

/// Register-file model of devices on an I2C bus.
#[derive(Default)]
pub struct MockI2c {
    devices: BTreeMap<u8, BTreeMap<u8, Vec<u8>>>,
    pointers: BTreeMap<u8, u8>,
    reject_repeated_start: bool,
    split_reads: usize,
}

impl MockI2c {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_device(&mut self, addr: u8) {
        self.devices.entry(addr).or_default();
    }

    pub fn set_register(&mut self, addr: u8, reg: u8, bytes: &[u8]) {
        self.devices
            .entry(addr)
            .or_default()
            .insert(reg, bytes.to_vec());
    }

    pub fn reject_repeated_start(&mut self, reject: bool) {
        self.reject_repeated_start = reject;
    }

    /// Register reads that went through the stop-then-read path.
    pub fn split_reads(&self) -> usize {
        self.split_reads
    }

    fn nack() -> ErrorKind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
    }

    fn fill(&self, addr: u8, buf: &mut [u8]) {
        let reg = self.pointers.get(&addr).copied().unwrap_or(0);
        let data = self.devices.get(&addr).and_then(|regs| regs.get(&reg));
        for (i, b) in buf.iter_mut().enumerate() {
            *b = data.and_then(|d| d.get(i)).copied().unwrap_or(0);
        }
    }
}

impl i2c::ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl i2c::I2c for MockI2c {
    fn read(&mut self, address: u8, read: &mut [u8]) -> Result<(), Self::Error> {
        if !self.devices.contains_key(&address) {
            return Err(Self::nack());
        }
        self.fill(address, read);
        self.split_reads += 1;
        Ok(())
    }

    fn write(&mut self, address: u8, write: &[u8]) -> Result<(), Self::Error> {
        if !self.devices.contains_key(&address) {
            return Err(Self::nack());
        }
        if let Some(&reg) = write.first() {
            self.pointers.insert(address, reg);
        }
        Ok(())
    }

    fn write_read(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<(), Self::Error> {
        if !self.devices.contains_key(&address) {
            return Err(Self::nack());
        }
        if self.reject_repeated_start {
            return Err(ErrorKind::Bus);
        }
        if let Some(&reg) = write.first() {
            self.pointers.insert(address, reg);
        }
        self.fill(address, read);
        Ok(())
    }

    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => self.write(address, bytes)?,
                Operation::Read(buf) => {
                    if !self.devices.contains_key(&address) {
                        return Err(Self::nack());
                    }
                    self.fill(address, buf);
                }
            }
        }
        Ok(())
    }
}
