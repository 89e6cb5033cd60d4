// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command execution

use std::sync::Arc;

use crate::{
    codec::encode_request,
    command::{validate, CommandParameters, ModbusRequest},
    correlator::{Correlator, Decoded},
    error::{ProtocolFailure, Result},
    frame::rtu::HexDump,
    report::{report_failure, Phase, Reporter},
    slot::ResultSlot,
    transport::Transport,
};

/// Progress of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    Idle,
    Sending,
    AwaitingResponse,
    Decoded,
    Failed,
}

/// Executes commands one at a time on a Modbus master transport.
///
/// [`ModbusIo::execute`] borrows `self` mutably and blocks until the
/// transport has delivered an outcome, so there is never more than one
/// request in flight. Responses are matched to requests by that fact alone.
#[derive(Debug)]
pub struct ModbusIo<T, R> {
    transport: T,
    reporter: R,
    slot: Arc<ResultSlot>,
    phase: Phase,
    state: State,
}

impl<T, R> ModbusIo<T, R>
where
    T: Transport,
    R: Reporter,
{
    /// Starts in [`Phase::Startup`].
    pub fn new(transport: T, reporter: R, slot: Arc<ResultSlot>) -> Self {
        Self {
            transport,
            reporter,
            slot,
            phase: Phase::Startup,
            state: State::Idle,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Switch to [`Phase::Running`] once the host processes its
    /// foreground task queue.
    pub fn set_phase(&mut self, phase: Phase) {
        log::debug!("Entering phase {phase:?}");
        self.phase = phase;
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub fn slot(&self) -> &Arc<ResultSlot> {
        &self.slot
    }

    #[must_use]
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut R {
        &mut self.reporter
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Validate, send and decode a command.
    ///
    /// Validation errors are returned before anything is sent. Protocol
    /// failures are reported through the [`Reporter`] and returned.
    pub fn execute(&mut self, params: &CommandParameters) -> Result<Decoded> {
        let request = validate(params)?;
        self.submit(&request)
    }

    /// Send an already validated request and decode its response.
    pub fn submit(&mut self, request: &ModbusRequest) -> Result<Decoded> {
        debug_assert_eq!(self.state, State::Idle);
        let adu = encode_request(request);
        self.transition(State::Sending);
        log::debug!("MODBUS TX: {}", HexDump(adu.data()));

        let slot = Arc::clone(&self.slot);
        let mut correlator = Correlator::new(&slot);
        self.transition(State::AwaitingResponse);
        let outcome = match self.transport.send(&adu, &mut correlator) {
            Ok(()) => correlator
                .into_outcome()
                .unwrap_or(Err(ProtocolFailure::NoResponse)),
            Err(err) => Err(ProtocolFailure::Transport(err)),
        };

        match outcome {
            Ok(decoded) => {
                self.transition(State::Decoded);
                self.transition(State::Idle);
                Ok(decoded)
            }
            Err(failure) => {
                self.transition(State::Failed);
                report_failure(&mut self.reporter, self.phase, &failure);
                self.transition(State::Idle);
                Err(failure.into())
            }
        }
    }

    fn transition(&mut self, next: State) {
        log::trace!("{:?} -> {next:?}", self.state);
        self.state = next;
    }
}
