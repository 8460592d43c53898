// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! `embedded-hal` 1.0 I2C on top of a blocking 0.2 implementation.
//!
//! The 0.2 traits carry a HAL-specific error type. [`BusFault`] classifies it so an address NACK
//! still reaches the driver as `Error::I2cNack`; anything the HAL cannot name becomes
//! [`ErrorKind::Other`], which surfaces as `Error::I2cTimeout`.

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};
use embedded_hal_02::blocking::i2c::{Read, Write, WriteRead};

#[cfg(feature = "board")]
use embedded_hal::i2c::NoAcknowledgeSource;

/// A HAL bus error that can be mapped onto an [`ErrorKind`].
pub trait BusFault: core::fmt::Debug {
    fn kind(&self) -> ErrorKind;
}

#[cfg(feature = "board")]
impl BusFault for stm32f7xx_hal::i2c::Error {
    #[allow(unreachable_patterns)]
    fn kind(&self) -> ErrorKind {
        use stm32f7xx_hal::i2c::Error as Hal;

        match self {
            Hal::Acknowledge => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
            Hal::Arbitration => ErrorKind::ArbitrationLoss,
            Hal::Bus => ErrorKind::Bus,
            // Timeout and overrun
            _ => ErrorKind::Other,
        }
    }
}

pub struct I2cBus<I> {
    inner: I,
}

impl<I> I2cBus<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }

    pub fn free(self) -> I {
        self.inner
    }
}

impl<I, E> ErrorType for I2cBus<I>
where
    I: Read<Error = E> + Write<Error = E> + WriteRead<Error = E>,
    E: BusFault,
{
    type Error = ErrorKind;
}

impl<I, E> I2c<SevenBitAddress> for I2cBus<I>
where
    I: Read<Error = E> + Write<Error = E> + WriteRead<Error = E>,
    E: BusFault,
{
    fn read(&mut self, address: u8, read: &mut [u8]) -> Result<(), ErrorKind> {
        Read::read(&mut self.inner, address, read).map_err(|e| e.kind())
    }

    fn write(&mut self, address: u8, write: &[u8]) -> Result<(), ErrorKind> {
        Write::write(&mut self.inner, address, write).map_err(|e| e.kind())
    }

    fn write_read(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<(), ErrorKind> {
        WriteRead::write_read(&mut self.inner, address, write, read).map_err(|e| e.kind())
    }

    /// Each operation runs as its own transfer; there is no repeated start between them.
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), ErrorKind> {
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => I2c::write(self, address, bytes)?,
                Operation::Read(buf) => I2c::read(self, address, buf)?,
            }
        }
        Ok(())
    }
}
