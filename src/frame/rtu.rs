// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use crate::{bytes::Bytes, slave::Slave};

use super::*;

/// `addr + function + 2 address bytes + 2 data bytes`, i.e. everything but the CRC.
pub const REQUEST_ADU_LEN: usize = 6;

/// Length of the trailing CRC of every RTU frame.
pub const CRC_LEN: usize = 2;

/// A request frame ready to be handed to a transport.
///
/// The CRC is appended by the transport so that `tx_length` always equals
/// `REQUEST_ADU_LEN + CRC_LEN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestAdu {
    pub(crate) context: Context,
    pub(crate) crc_check: bool,
    pub(crate) data: [u8; REQUEST_ADU_LEN],
    pub(crate) tx_length: u8,
    pub(crate) rx_length: u8,
}

impl RequestAdu {
    #[must_use]
    pub const fn context(&self) -> Context {
        self.context
    }

    /// Whether the transport must verify the CRC of the response.
    #[must_use]
    pub const fn crc_check(&self) -> bool {
        self.crc_check
    }

    /// The frame without its CRC.
    #[must_use]
    pub const fn data(&self) -> &[u8; REQUEST_ADU_LEN] {
        &self.data
    }

    #[must_use]
    pub const fn slave(&self) -> Slave {
        Slave(self.data[0])
    }

    #[must_use]
    pub const fn function_code(&self) -> FunctionCode {
        FunctionCode::new(self.data[1])
    }

    #[must_use]
    pub const fn tx_length(&self) -> usize {
        self.tx_length as usize
    }

    #[must_use]
    pub const fn rx_length(&self) -> usize {
        self.rx_length as usize
    }
}

/// A received frame together with the context of the request it answers.
///
/// The frame still contains the leading address byte. Whether it still
/// carries the CRC depends on the transport and is irrelevant for decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseAdu {
    pub(crate) context: Context,
    pub(crate) data: Bytes,
}

impl ResponseAdu {
    pub fn new(context: Context, data: impl Into<Bytes>) -> Self {
        Self {
            context,
            data: data.into(),
        }
    }

    #[must_use]
    pub const fn context(&self) -> Context {
        self.context
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The raw function code byte, if the frame is long enough to have one.
    #[must_use]
    pub fn function(&self) -> Option<u8> {
        self.data.get(1).copied()
    }

    /// `true` if the function code byte is flagged as an exception response.
    #[must_use]
    pub fn is_exception(&self) -> bool {
        self.function()
            .is_some_and(|function| function & EXCEPTION_FLAG != 0)
    }
}

/// Formats a frame as space separated hex bytes for the debug log.
pub(crate) struct HexDump<'a>(pub(crate) &'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = self.0.iter();
        if let Some(first) = bytes.next() {
            write!(f, "{first:02X}")?;
        }
        for byte in bytes {
            write!(f, " {byte:02X}")?;
        }
        Ok(())
    }
}
