// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command parameters and their validation
//!
//! A command consists of the words
//!
//! - `D{0..247}`: device address
//! - `E{1..6}`: function code
//! - `P{1..9999}`: register reference, one-based
//! - `Q{0..65535}`: value, optional for reads and required for writes
//!
//! e.g. `D2 E5 P1 Q1` switches on the first coil of device 2 and
//! `D2 E1 P1 Q4` reads the first four coils.

use std::{fmt, ops::RangeInclusive};

use crate::{
    error::ValidationError,
    frame::{coil_to_word, Address, Function, FunctionCode, Word},
    slave::Slave,
};

const DEVICE_RANGE: RangeInclusive<i64> =
    Slave::broadcast().0 as i64..=Slave::max_device().0 as i64;
const FUNCTION_RANGE: RangeInclusive<i64> = 1..=6;
const REGISTER_RANGE: RangeInclusive<i64> = 1..=9999;
const VALUE_RANGE: RangeInclusive<i64> = 0..=65535;

/// A word of the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Device,
    Function,
    Register,
    Value,
}

impl Field {
    /// The letter the word is written with.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Device => 'D',
            Self::Function => 'E',
            Self::Register => 'P',
            Self::Value => 'Q',
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// The raw words of a command as the host parser delivers them.
///
/// Numbers arrive as floats and may be missing or fractional.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CommandParameters {
    pub device: Option<f32>,
    pub function: Option<f32>,
    pub register: Option<f32>,
    pub value: Option<f32>,
}

impl CommandParameters {
    #[must_use]
    pub const fn new(device: f32, function: f32, register: f32) -> Self {
        Self {
            device: Some(device),
            function: Some(function),
            register: Some(register),
            value: None,
        }
    }

    #[must_use]
    pub const fn with_value(mut self, value: f32) -> Self {
        self.value = Some(value);
        self
    }
}

/// A validated and normalized request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModbusRequest {
    pub(crate) slave: Slave,
    pub(crate) function: Function,
    pub(crate) address: Address,
    pub(crate) value: Word,
}

impl ModbusRequest {
    #[must_use]
    pub const fn slave(&self) -> Slave {
        self.slave
    }

    /// One of the six supported function codes.
    #[must_use]
    pub const fn function_code(&self) -> FunctionCode {
        self.function.code()
    }

    /// The zero-based protocol address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Quantity to read, or the value to write in its wire encoding.
    #[must_use]
    pub const fn value(&self) -> Word {
        self.value
    }
}

impl TryFrom<&CommandParameters> for ModbusRequest {
    type Error = ValidationError;

    fn try_from(params: &CommandParameters) -> Result<Self, Self::Error> {
        validate(params)
    }
}

/// Validate the words of a command and normalize them into a request.
///
/// Every presence and number format check is done before any range
/// check, so a missing word is always reported as
/// [`ValidationError::BadNumberFormat`].
pub fn validate(params: &CommandParameters) -> Result<ModbusRequest, ValidationError> {
    let device = integer(Field::Device, params.device)?;
    let function = integer(Field::Function, params.function)?;
    let register = integer(Field::Register, params.register)?;
    let value = match params.value {
        Some(value) => Some(integer(Field::Value, Some(value))?),
        None => None,
    };
    if value.is_none() && matches!(function, 5 | 6) {
        return Err(ValidationError::BadNumberFormat(Field::Value));
    }

    let slave = Slave(checked(Field::Device, device, DEVICE_RANGE)?);
    let function = Function::new(FunctionCode::new(checked(
        Field::Function,
        function,
        FUNCTION_RANGE,
    )?))
    .ok_or(ValidationError::ValueOutOfRange(Field::Function))?;
    let register: u16 = checked(Field::Register, register, REGISTER_RANGE)?;
    let value: Option<Word> = value
        .map(|value| checked(Field::Value, value, VALUE_RANGE))
        .transpose()?;

    let value = match function {
        Function::ReadDiscreteInputs
        | Function::ReadInputRegisters
        | Function::ReadHoldingRegisters => 1,
        Function::ReadCoils => value.unwrap_or(1),
        Function::WriteSingleCoil => coil_to_word(value.unwrap_or_default() > 0),
        Function::WriteSingleRegister => value.unwrap_or_default(),
    };

    Ok(ModbusRequest {
        slave,
        function,
        address: register - 1,
        value,
    })
}

#[allow(clippy::cast_possible_truncation)]
fn integer(field: Field, value: Option<f32>) -> Result<i64, ValidationError> {
    match value {
        Some(value) if value.is_finite() && value.fract() == 0.0 => Ok(value as i64),
        _ => Err(ValidationError::BadNumberFormat(field)),
    }
}

fn checked<T>(field: Field, value: i64, range: RangeInclusive<i64>) -> Result<T, ValidationError>
where
    T: TryFrom<i64>,
{
    if !range.contains(&value) {
        return Err(ValidationError::ValueOutOfRange(field));
    }
    T::try_from(value).map_err(|_| ValidationError::ValueOutOfRange(field))
}
