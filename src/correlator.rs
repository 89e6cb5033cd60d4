// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoding of responses

use crate::{
    codec::read_u16_be,
    error::ProtocolFailure,
    frame::{rtu::HexDump, Context, ExceptionCode, FunctionCode, ResponseAdu, EXCEPTION_FLAG},
    slot::ResultSlot,
    transport::ResponseHandler,
};

/// Position of the first data byte of a read response,
/// after `addr + function + byte count`.
const PAYLOAD_OFFSET: usize = 3;

/// The result of a completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A read returned this value. It has been stored in the result slot.
    Value(i32),
    /// A write has been acknowledged by its echo.
    Acknowledged,
    /// The response belongs to a request of someone else and has been
    /// left alone.
    Foreign,
}

/// Decode a response frame.
///
/// The function code is taken from the frame itself. Nothing about the
/// request is known at this point besides its context.
pub fn decode(response: &ResponseAdu) -> Result<Decoded, ProtocolFailure> {
    let data = response.data();
    let Some(function) = response.function() else {
        return Err(ProtocolFailure::MalformedFrame { len: data.len() });
    };
    if function & EXCEPTION_FLAG != 0 {
        let exception = data
            .get(2)
            .copied()
            .map_or(ExceptionCode::Custom(0), ExceptionCode::new);
        return Err(ProtocolFailure::Exception {
            function: function & !EXCEPTION_FLAG,
            exception,
        });
    }

    let function = FunctionCode::new(function);
    let payload = || {
        data.get(PAYLOAD_OFFSET)
            .copied()
            .ok_or(ProtocolFailure::MalformedFrame { len: data.len() })
    };
    let decoded = match function {
        FunctionCode::ReadDiscreteInputs => match payload()? {
            0x00 => {
                log::debug!("MODBUS RESPONSE: off");
                Decoded::Value(0)
            }
            0x01 => {
                log::debug!("MODBUS RESPONSE: on");
                Decoded::Value(1)
            }
            value => return Err(ProtocolFailure::UnexpectedPayload { function, value }),
        },
        FunctionCode::ReadCoils => {
            let value = payload()?;
            log::debug!("MODBUS RESPONSE: {value} (0x{value:02X})");
            Decoded::Value(i32::from(value))
        }
        FunctionCode::ReadInputRegisters | FunctionCode::ReadHoldingRegisters => {
            let value = data
                .get(PAYLOAD_OFFSET..)
                .and_then(|payload| read_u16_be(payload).ok())
                .ok_or(ProtocolFailure::MalformedFrame { len: data.len() })?;
            log::debug!("MODBUS RESPONSE: {value} (0x{value:04X})");
            Decoded::Value(i32::from(value))
        }
        FunctionCode::WriteSingleCoil | FunctionCode::WriteSingleRegister => {
            log::debug!("MODBUS RESPONSE: OK");
            Decoded::Acknowledged
        }
        FunctionCode::Custom(code) => return Err(ProtocolFailure::UnexpectedFunction(code)),
    };
    Ok(decoded)
}

/// Matches the outcome delivered by a transport to the one outstanding
/// request and stores decoded values.
///
/// There is no request identity to compare with. Any response tagged with
/// [`Context::Command`] is taken as the answer to the request in flight.
#[derive(Debug)]
pub struct Correlator<'a> {
    slot: &'a ResultSlot,
    outcome: Option<Result<Decoded, ProtocolFailure>>,
}

impl<'a> Correlator<'a> {
    #[must_use]
    pub fn new(slot: &'a ResultSlot) -> Self {
        Self {
            slot,
            outcome: None,
        }
    }

    /// `None` if no callback has been invoked.
    #[must_use]
    pub fn into_outcome(self) -> Option<Result<Decoded, ProtocolFailure>> {
        self.outcome
    }

    fn complete(&mut self, outcome: Result<Decoded, ProtocolFailure>) {
        if self.outcome.is_some() {
            log::warn!("Discarding outcome of an already completed request: {outcome:?}");
            return;
        }
        self.outcome = Some(outcome);
    }
}

impl ResponseHandler for Correlator<'_> {
    fn on_response(&mut self, response: ResponseAdu) {
        log::debug!("MODBUS RX: {}", HexDump(response.data()));
        if self.outcome.is_some() {
            self.complete(Ok(Decoded::Foreign));
            return;
        }
        let outcome = if !response.is_exception() && response.context() != Context::Command {
            log::debug!("Ignoring response with context {:?}", response.context());
            Ok(Decoded::Foreign)
        } else {
            decode(&response)
        };
        if let Ok(Decoded::Value(value)) = outcome {
            self.slot.set(value);
        }
        self.complete(outcome);
    }

    fn on_exception(&mut self, exception: ExceptionCode, context: Context) {
        log::debug!("MODBUS EXCEPTION: {exception} ({context:?})");
        self.complete(Err(ProtocolFailure::ExceptionCallback(exception)));
    }
}
