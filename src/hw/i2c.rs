// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! I2C register access on top of `embedded_hal::i2c::I2c`.
//!
//! Devices on this bus are not consistent about repeated starts, so a register read first tries
//! write + repeated-start read and falls back to a stop between the pointer write and the read.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};

/// Errors surfaced by bus-touching operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Transfer did not complete (timeout, bus fault, arbitration loss).
    I2cTimeout,
    /// Address or data byte was not acknowledged.
    I2cNack,
    /// No candidate address answered during initialization.
    DeviceNotFound,
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoAcknowledge(_) => Error::I2cNack,
            _ => Error::I2cTimeout,
        }
    }
}

/// Read `buf.len()` bytes starting at register `reg` of device `addr`.
pub fn read_register<I: I2c>(bus: &mut I, addr: u8, reg: u8, buf: &mut [u8]) -> Result<(), Error> {
    if bus.write_read(addr, &[reg], buf).is_ok() {
        return Ok(());
    }

    // Stop-then-read framing
    bus.write(addr, &[reg]).map_err(|e| Error::from(e.kind()))?;
    bus.read(addr, buf).map_err(|e| Error::from(e.kind()))
}

/// Set of 7-bit addresses that acknowledged during a scan.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanResult {
    bits: u128,
}

impl ScanResult {
    #[inline]
    pub fn contains(&self, addr: u8) -> bool {
        addr < 128 && (self.bits & (1u128 << addr)) != 0
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.bits.count_ones()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Responding addresses in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0u8..128).filter(move |&a| self.contains(a))
    }

    fn insert(&mut self, addr: u8) {
        self.bits |= 1u128 << (addr & 0x7F);
    }
}

/// Probe every address in `first..=last` with an empty write.
pub fn scan<I: I2c>(bus: &mut I, first: u8, last: u8) -> ScanResult {
    let mut found = ScanResult::default();
    for addr in first..=last.min(0x7F) {
        if bus.write(addr, &[]).is_ok() {
            found.insert(addr);
        }
    }
    found
}
