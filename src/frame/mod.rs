// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

pub(crate) mod rtu;

use std::{
    error,
    fmt::{self, Display},
};

pub use self::rtu::{RequestAdu, ResponseAdu};

/// Bit that marks the function code of an exception response.
pub const EXCEPTION_FLAG: u8 = 0x80;

/// A Modbus function code.
///
/// Only the single item read/write functions are issued by this crate.
/// Everything else that shows up on the wire is kept as [`FunctionCode::Custom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionCode {
    /// 01 (0x01) Read Coils.
    ReadCoils,

    /// 02 (0x02) Read Discrete Inputs
    ReadDiscreteInputs,

    /// 03 (0x03) Read Holding Registers
    ReadHoldingRegisters,

    /// 04 (0x04) Read Input Registers
    ReadInputRegisters,

    /// 05 (0x05) Write Single Coil
    WriteSingleCoil,

    /// 06 (0x06) Write Single Register
    WriteSingleRegister,

    /// Any other function code.
    Custom(u8),
}

impl FunctionCode {
    /// Create a new [`FunctionCode`] with `value`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        match value {
            0x01 => Self::ReadCoils,
            0x02 => Self::ReadDiscreteInputs,
            0x03 => Self::ReadHoldingRegisters,
            0x04 => Self::ReadInputRegisters,
            0x05 => Self::WriteSingleCoil,
            0x06 => Self::WriteSingleRegister,
            code => Self::Custom(code),
        }
    }

    /// Gets the [`u8`] value of the current [`FunctionCode`].
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::ReadCoils => 0x01,
            Self::ReadDiscreteInputs => 0x02,
            Self::ReadHoldingRegisters => 0x03,
            Self::ReadInputRegisters => 0x04,
            Self::WriteSingleCoil => 0x05,
            Self::WriteSingleRegister => 0x06,
            Self::Custom(code) => code,
        }
    }

    /// `true` for the six function codes a command may select.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        Function::new(self).is_some()
    }

    /// Number of bytes the transport sends, CRC included.
    #[must_use]
    pub const fn tx_length(self) -> Option<u8> {
        match Function::new(self) {
            Some(function) => Some(function.tx_length()),
            None => None,
        }
    }

    /// Number of bytes the transport expects to receive, CRC included.
    #[must_use]
    pub const fn rx_length(self) -> Option<u8> {
        match Function::new(self) {
            Some(function) => Some(function.rx_length()),
            None => None,
        }
    }
}

/// One of the function codes a command can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Function {
    ReadCoils,
    ReadDiscreteInputs,
    ReadHoldingRegisters,
    ReadInputRegisters,
    WriteSingleCoil,
    WriteSingleRegister,
}

impl Function {
    pub(crate) const fn new(code: FunctionCode) -> Option<Self> {
        let function = match code {
            FunctionCode::ReadCoils => Self::ReadCoils,
            FunctionCode::ReadDiscreteInputs => Self::ReadDiscreteInputs,
            FunctionCode::ReadHoldingRegisters => Self::ReadHoldingRegisters,
            FunctionCode::ReadInputRegisters => Self::ReadInputRegisters,
            FunctionCode::WriteSingleCoil => Self::WriteSingleCoil,
            FunctionCode::WriteSingleRegister => Self::WriteSingleRegister,
            FunctionCode::Custom(_) => return None,
        };
        Some(function)
    }

    pub(crate) const fn code(self) -> FunctionCode {
        match self {
            Self::ReadCoils => FunctionCode::ReadCoils,
            Self::ReadDiscreteInputs => FunctionCode::ReadDiscreteInputs,
            Self::ReadHoldingRegisters => FunctionCode::ReadHoldingRegisters,
            Self::ReadInputRegisters => FunctionCode::ReadInputRegisters,
            Self::WriteSingleCoil => FunctionCode::WriteSingleCoil,
            Self::WriteSingleRegister => FunctionCode::WriteSingleRegister,
        }
    }

    /// `addr + function + data + crc`
    pub(crate) const fn tx_length(self) -> u8 {
        8
    }

    /// `addr + function + byte count + data + crc` for the reads and an echo
    /// of the request for the writes.
    pub(crate) const fn rx_length(self) -> u8 {
        match self {
            Self::ReadCoils | Self::ReadDiscreteInputs => 6,
            Self::ReadHoldingRegisters | Self::ReadInputRegisters => 7,
            Self::WriteSingleCoil | Self::WriteSingleRegister => 8,
        }
    }
}

impl Display for FunctionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value().fmt(f)
    }
}

/// A Modbus protocol address is represented by 16 bit from `0` to `65535`.
///
/// This *protocol address* uses 0-based indexing, while the register
/// reference of a command uses 1-based indexing.
pub type Address = u16;

/// A Coil represents a single bit.
///
/// - `true` is equivalent to `ON`, `1` and `0xFF00`.
/// - `false` is equivalent to `OFF`, `0` and `0x0000`.
pub type Coil = bool;

/// Modbus uses 16 bit for its data items.
///
/// Transmitted using a big-endian representation.
pub type Word = u16;

/// Wire encoding of a coil state.
#[must_use]
pub const fn coil_to_word(coil: Coil) -> Word {
    if coil {
        0xFF00
    } else {
        0x0000
    }
}

/// Tag attached to an outgoing request and echoed back by the transport.
///
/// The tag tells who issued a request, not which request it was. Matching a
/// response to its request by tag alone is sound only because at most one
/// request is outstanding at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Context {
    /// Not issued by this crate.
    #[default]
    Idle,
    /// A request built from a command.
    Command,
}

/// A server (slave) exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionCode {
    /// 0x01
    IllegalFunction,
    /// 0x02
    IllegalDataAddress,
    /// 0x03
    IllegalDataValue,
    /// 0x04
    ServerDeviceFailure,
    /// 0x05
    Acknowledge,
    /// 0x06
    ServerDeviceBusy,
    /// 0x08
    MemoryParityError,
    /// 0x0A
    GatewayPathUnavailable,
    /// 0x0B
    GatewayTargetDevice,
    /// None of the above.
    Custom(u8),
}

impl From<ExceptionCode> for u8 {
    fn from(from: ExceptionCode) -> Self {
        use crate::frame::ExceptionCode::*;
        match from {
            IllegalFunction => 0x01,
            IllegalDataAddress => 0x02,
            IllegalDataValue => 0x03,
            ServerDeviceFailure => 0x04,
            Acknowledge => 0x05,
            ServerDeviceBusy => 0x06,
            MemoryParityError => 0x08,
            GatewayPathUnavailable => 0x0A,
            GatewayTargetDevice => 0x0B,
            Custom(code) => code,
        }
    }
}

impl ExceptionCode {
    /// Create a new [`ExceptionCode`] with `value`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        use crate::frame::ExceptionCode::*;

        match value {
            0x01 => IllegalFunction,
            0x02 => IllegalDataAddress,
            0x03 => IllegalDataValue,
            0x04 => ServerDeviceFailure,
            0x05 => Acknowledge,
            0x06 => ServerDeviceBusy,
            0x08 => MemoryParityError,
            0x0A => GatewayPathUnavailable,
            0x0B => GatewayTargetDevice,
            other => Custom(other),
        }
    }

    pub(crate) fn description(&self) -> &str {
        use crate::frame::ExceptionCode::*;

        match *self {
            IllegalFunction => "Illegal function",
            IllegalDataAddress => "Illegal data address",
            IllegalDataValue => "Illegal data value",
            ServerDeviceFailure => "Server device failure",
            Acknowledge => "Acknowledge",
            ServerDeviceBusy => "Server device busy",
            MemoryParityError => "Memory parity error",
            GatewayPathUnavailable => "Gateway path unavailable",
            GatewayTargetDevice => "Gateway target device failed to respond",
            Custom(_) => "Custom",
        }
    }
}

impl fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.description(), u8::from(*self))
    }
}

impl error::Error for ExceptionCode {}
