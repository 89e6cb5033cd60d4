// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blocking Modbus RTU transport

use std::{io, time::Duration};

use futures_util::{FutureExt as _, SinkExt as _, StreamExt as _};
use tokio::{
    io::{AsyncRead, AsyncReadExt as _, AsyncWrite},
    runtime::{Builder, Runtime},
};
use tokio_util::codec::Framed;

use crate::{
    bytes::Bytes,
    codec::rtu::ClientCodec,
    frame::{ExceptionCode, RequestAdu, ResponseAdu},
};

use super::{ResponseHandler, Transport};

/// Default time to wait for a response.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Read buffer size of a single round trip, large enough for every
/// response frame.
const READ_CAPACITY: usize = 256;

/// _Modbus_ RTU transport on top of any byte stream.
///
/// Owns a single threaded runtime and blocks on it for every round trip.
/// Each round trip frames the stream anew, so neither buffered bytes nor
/// a decoding error of a failed request carry over to the next one.
#[derive(Debug)]
pub struct RtuTransport<T> {
    runtime: Runtime,
    stream: T,
    timeout: Duration,
}

impl<T> RtuTransport<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(transport: T) -> io::Result<Self> {
        let runtime = new_runtime()?;
        Ok(Self::with_runtime(runtime, transport))
    }

    fn with_runtime(runtime: Runtime, stream: T) -> Self {
        Self {
            runtime,
            stream,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Limit the time to wait for a response.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn round_trip(&mut self, request: &RequestAdu) -> io::Result<Bytes> {
        let Self {
            runtime,
            stream,
            timeout,
        } = self;

        let mut codec = ClientCodec::default();
        codec.expect_response_to(request);

        runtime.block_on(async {
            discard_pending_input(stream)?;
            let mut framed = Framed::with_capacity(stream, codec, READ_CAPACITY);
            framed.send(*request).await?;
            let Ok(response) = tokio::time::timeout(*timeout, framed.next()).await else {
                log::debug!("No response within {timeout:?}");
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "no response within timeout",
                ));
            };
            response.unwrap_or_else(|| Err(io::Error::from(io::ErrorKind::BrokenPipe)))
        })
    }
}

#[cfg(feature = "serial")]
impl RtuTransport<tokio_serial::SerialStream> {
    /// Open a serial port.
    pub fn open(builder: &tokio_serial::SerialPortBuilder) -> io::Result<Self> {
        let runtime = new_runtime()?;
        let serial = {
            // The serial stream registers itself with the runtime's reactor.
            let _guard = runtime.enter();
            tokio_serial::SerialStream::open(builder)?
        };
        Ok(Self::with_runtime(runtime, serial))
    }
}

fn new_runtime() -> io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}

/// Drop whatever has arrived since the last round trip, e.g. a response
/// that came in after its request had timed out.
fn discard_pending_input<T>(stream: &mut T) -> io::Result<()>
where
    T: AsyncRead + Unpin,
{
    let mut buf = [0; READ_CAPACITY];
    loop {
        match stream.read(&mut buf).now_or_never() {
            // nothing pending or end of stream
            None | Some(Ok(0)) => return Ok(()),
            Some(Ok(len)) => log::debug!("Discarding {len} stale byte(s)"),
            Some(Err(err)) => return Err(err),
        }
    }
}

impl<T> Transport for RtuTransport<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    fn send(&mut self, request: &RequestAdu, handler: &mut dyn ResponseHandler) -> io::Result<()> {
        let data = self.round_trip(request)?;
        let response = ResponseAdu::new(request.context(), data);
        if response.is_exception() {
            let exception = response
                .data()
                .get(2)
                .copied()
                .map_or(ExceptionCode::Custom(0), ExceptionCode::new);
            handler.on_exception(exception, request.context());
        } else {
            handler.on_response(response);
        }
        Ok(())
    }
}
