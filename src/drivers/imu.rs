// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! I2C attitude module with on-board fusion.
//!
//! Register map (all blocks are 12 bytes, three little-endian `i32`, scaled by `1e-6`):
//!
//! | Register | Contents | Unit |
//! | -------- | -------- | ---- |
//! | `0x20` | gyro rate X, Y, Z | °/s |
//! | `0x40` | pitch, roll, yaw | ° |
//!
//! The module ships with one of a few strap-selectable addresses, so [`Imu::init`] probes the
//! candidates in order and falls back to a full bus scan for diagnostics.

use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::config::{
    I2C_SCAN_FIRST, I2C_SCAN_LAST, IMU_ADDRESSES, IMU_REG_EULER, IMU_REG_GYRO, IMU_SCALE,
};
use crate::hw::i2c::{self, Error};
use crate::hw::RateGyro;

const BLOCK_LEN: usize = 12;

/// Decode a 12-byte register block into three scaled values.
pub fn decode_block(raw: &[u8; BLOCK_LEN]) -> [f32; 3] {
    let mut out = [0.0f32; 3];
    for (value, chunk) in out.iter_mut().zip(raw.chunks_exact(4)) {
        let word = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        *value = word as f32 * IMU_SCALE;
    }
    out
}

pub struct Imu<I: I2c> {
    bus: I,
    candidates: [u8; 3],
    address: Option<u8>,
}

impl<I: I2c> Imu<I> {
    /// Create a driver that probes the default candidate addresses.
    pub fn new(bus: I) -> Self {
        Self::with_addresses(bus, IMU_ADDRESSES)
    }

    pub fn with_addresses(bus: I, candidates: [u8; 3]) -> Self {
        Self {
            bus,
            candidates,
            address: None,
        }
    }

    /// Release the bus.
    pub fn free(self) -> I {
        self.bus
    }

    /// Address the device answered on, once initialized.
    #[inline]
    pub fn address(&self) -> Option<u8> {
        self.address
    }

    fn read_block(&mut self, reg: u8) -> Result<[f32; 3], Error> {
        let addr = self.address.ok_or(Error::DeviceNotFound)?;
        let mut raw = [0u8; BLOCK_LEN];
        i2c::read_register(&mut self.bus, addr, reg, &mut raw)?;
        Ok(decode_block(&raw))
    }

    /// Gyro rates `(x, y, z)` in °/s.
    pub fn read_gyro(&mut self) -> Result<[f32; 3], Error> {
        self.read_block(IMU_REG_GYRO)
    }

    /// Probe candidate addresses; on failure scan the bus and log what answered.
    pub fn init(&mut self) -> Result<u8, Error> {
        let mut raw = [0u8; BLOCK_LEN];
        for &addr in self.candidates.iter() {
            match i2c::read_register(&mut self.bus, addr, IMU_REG_GYRO, &mut raw) {
                Ok(()) => {
                    info!("imu: found at {:#04x}", addr);
                    self.address = Some(addr);
                    return Ok(addr);
                }
                Err(e) => warn!("imu: no answer at {:#04x}: {:?}", addr, e),
            }
        }

        self.address = None;
        let found = i2c::scan(&mut self.bus, I2C_SCAN_FIRST, I2C_SCAN_LAST);
        if found.is_empty() {
            warn!("imu: bus scan found no devices");
        }
        for addr in found.iter() {
            warn!("imu: bus scan found device at {:#04x}", addr);
        }
        Err(Error::DeviceNotFound)
    }
}

impl<I: I2c> RateGyro for Imu<I> {
    fn init(&mut self) -> Result<(), Error> {
        Imu::init(self).map(|_| ())
    }

    fn read_gyro_z_dps(&mut self) -> Result<f32, Error> {
        Ok(self.read_gyro()?[2])
    }

    fn read_euler(&mut self) -> Result<(f32, f32, f32), Error> {
        let [pitch, roll, yaw] = self.read_block(IMU_REG_EULER)?;
        Ok((pitch, roll, yaw))
    }
}
