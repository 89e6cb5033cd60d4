// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types.

use std::io;

use thiserror::Error;

use crate::{command::Field, ExceptionCode, FunctionCode};

/// A command was rejected before anything has been sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required word is missing or its value is not an integer.
    #[error("bad number format: {0}")]
    BadNumberFormat(Field),

    /// A word is present but outside of its valid range, or the function
    /// code is not supported.
    #[error("value out of range: {0}")]
    ValueOutOfRange(Field),
}

/// A request has been sent but did not complete successfully.
#[derive(Debug, Error)]
pub enum ProtocolFailure {
    /// The device answered with an exception response.
    #[error("exception response to function {function}: {exception}")]
    Exception {
        function: u8,
        exception: ExceptionCode,
    },

    /// The transport reported an exception instead of delivering a frame.
    #[error("transport exception: {0}")]
    ExceptionCallback(ExceptionCode),

    /// The payload has a value the function does not allow.
    #[error("unexpected payload 0x{value:02X} for function {function}")]
    UnexpectedPayload { function: FunctionCode, value: u8 },

    /// The echoed function code is none of the supported ones.
    #[error("unexpected function code 0x{0:02X}")]
    UnexpectedFunction(u8),

    /// The frame is too short to carry what its function code announces.
    #[error("malformed frame of {len} byte(s)")]
    MalformedFrame { len: usize },

    /// The transport returned without invoking any callback.
    #[error("no response")]
    NoResponse,

    /// The transport failed to complete the round trip.
    #[error(transparent)]
    Transport(#[from] io::Error),
}

/// Error type of a command execution.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Protocol(#[from] ProtocolFailure),
}

/// Specialized [`std::result::Result`] type for command execution.
pub type Result<T> = std::result::Result<T, Error>;
