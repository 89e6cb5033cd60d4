// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus I/O commands for machine controllers.
//!
//! Translates a numeric command of the form
//! `D{0..247} E{1..6} P{1..9999} [Q{0..65535}]` into a single
//! [Modbus](https://en.wikipedia.org/wiki/Modbus) RTU request, sends it
//! through a master transport and stores the value of the response in a
//! shared [`ResultSlot`] that the host can read later.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use modbus_io::{
//!     report::{Alarm, Deferred, Reporter},
//!     transport::rtu::RtuTransport,
//!     CommandParameters, ModbusIo, Phase, ResultSlot,
//! };
//!
//! struct Host;
//!
//! impl Reporter for Host {
//!     fn raise_alarm(&mut self, alarm: Alarm) {
//!         eprintln!("ALARM: {alarm}");
//!     }
//!
//!     fn enqueue_deferred(&mut self, task: Deferred) {
//!         task.run(self);
//!     }
//!
//!     fn warn(&mut self, message: &str) {
//!         eprintln!("{message}");
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let stream = tokio::io::duplex(64).0;
//! let slot = Arc::new(ResultSlot::default());
//! let mut mbio = ModbusIo::new(RtuTransport::new(stream)?, Host, Arc::clone(&slot));
//! mbio.set_phase(Phase::Running);
//!
//! // Read holding register 254 of device 2
//! mbio.execute(&CommandParameters::new(2.0, 3.0, 254.0))?;
//! println!("{}", slot.get());
//! # Ok(())
//! # }
//! ```

#![warn(rust_2018_idioms)]

pub mod bytes {
    //! Re-exports of the `bytes` crate types used in the public API
    pub use ::bytes::{Buf, BufMut, Bytes, BytesMut};
}

pub mod command;
pub use self::command::{validate, CommandParameters, Field, ModbusRequest};

mod codec;
pub use self::codec::encode_request;

pub mod correlator;
pub use self::correlator::{decode, Correlator, Decoded};

mod error;
pub use self::error::{Error, ProtocolFailure, Result, ValidationError};

mod frame;
pub use self::frame::{
    coil_to_word, Address, Coil, Context, ExceptionCode, FunctionCode, RequestAdu, ResponseAdu,
    Word, EXCEPTION_FLAG,
};

mod io;
pub use self::io::{ModbusIo, State};

pub mod prelude;

pub mod report;
pub use self::report::Phase;

mod slave;
pub use self::slave::{Slave, SlaveId};

mod slot;
pub use self::slot::ResultSlot;

pub mod transport;
pub use self::transport::{ResponseHandler, Transport};
