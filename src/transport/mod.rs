// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus master transports

use std::io;

use crate::frame::{Context, ExceptionCode, RequestAdu, ResponseAdu};

#[cfg(feature = "rtu")]
pub mod rtu;

/// Receives the outcome of a request.
///
/// A transport invokes exactly one of the two methods for every request
/// that it has sent successfully.
pub trait ResponseHandler {
    /// A response frame has been received.
    fn on_response(&mut self, response: ResponseAdu);

    /// The request failed with an exception.
    fn on_exception(&mut self, exception: ExceptionCode, context: Context);
}

/// A blocking Modbus master transport.
pub trait Transport {
    /// Send a request and block until its outcome has been delivered
    /// to `handler`.
    ///
    /// Retries and timeouts are up to the transport. An error means that
    /// `handler` has not been invoked.
    fn send(&mut self, request: &RequestAdu, handler: &mut dyn ResponseHandler) -> io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, request: &RequestAdu, handler: &mut dyn ResponseHandler) -> io::Result<()> {
        (**self).send(request, handler)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, request: &RequestAdu, handler: &mut dyn ResponseHandler) -> io::Result<()> {
        (**self).send(request, handler)
    }
}
