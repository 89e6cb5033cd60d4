// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::io::{self, Cursor};

use byteorder::{BigEndian, ReadBytesExt as _};

use crate::{
    bytes::BufMut as _,
    command::ModbusRequest,
    frame::{rtu::REQUEST_ADU_LEN, Context, RequestAdu},
};

#[cfg(feature = "rtu")]
pub(crate) mod rtu;

/// Encode a validated request into a request frame.
///
/// The frame is `[slave, function, addr_hi, addr_lo, data_hi, data_lo]`
/// and the transport appends the CRC. The data word holds the quantity
/// for reads and the value for writes.
#[must_use]
pub fn encode_request(request: &ModbusRequest) -> RequestAdu {
    let function = request.function;

    let mut data = [0; REQUEST_ADU_LEN];
    let mut buf = &mut data[..];
    buf.put_u8(request.slave().into());
    buf.put_u8(function.code().value());
    buf.put_u16(request.address());
    buf.put_u16(request.value());

    RequestAdu {
        context: Context::Command,
        crc_check: true,
        data,
        tx_length: function.tx_length(),
        rx_length: function.rx_length(),
    }
}

pub(crate) fn read_u16_be(bytes: &[u8]) -> io::Result<u16> {
    Cursor::new(bytes).read_u16::<BigEndian>()
}
