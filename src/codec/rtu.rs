// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::io::{Error, ErrorKind, Result};

use tokio_util::codec::{Decoder, Encoder};

use crate::{
    bytes::{BufMut as _, Bytes, BytesMut},
    frame::{rtu::CRC_LEN, RequestAdu, EXCEPTION_FLAG},
};

/// `addr + function | 0x80 + exception code + crc`
const EXCEPTION_ADU_LEN: usize = 1 + 1 + 1 + CRC_LEN;

pub(crate) fn calc_crc(data: &[u8]) -> u16 {
    let mut crc = 0xFFFF;
    for x in data {
        crc ^= u16::from(*x);
        for _ in 0..8 {
            if (crc & 0x0001) != 0 {
                crc >>= 1;
                crc ^= 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc << 8 | crc >> 8
}

/// Client side RTU framing with a response length known in advance.
///
/// The expected length has to be set before each request, because the
/// frames of this protocol subset carry no length field that covers all
/// of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClientCodec {
    rx_length: usize,
    crc_check: bool,
}

impl Default for ClientCodec {
    fn default() -> Self {
        Self {
            rx_length: EXCEPTION_ADU_LEN,
            crc_check: true,
        }
    }
}

impl ClientCodec {
    pub(crate) fn expect_response_to(&mut self, adu: &RequestAdu) {
        self.rx_length = adu.rx_length();
        self.crc_check = adu.crc_check();
    }
}

impl Decoder for ClientCodec {
    type Item = Bytes;
    type Error = Error;

    /// Yields the frame without its CRC.
    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Bytes>> {
        if buf.len() < 2 {
            // incomplete frame
            return Ok(None);
        }
        let adu_len = if buf[1] & EXCEPTION_FLAG != 0 {
            EXCEPTION_ADU_LEN
        } else {
            self.rx_length
        };
        if buf.len() < adu_len {
            // incomplete frame
            return Ok(None);
        }

        let mut adu = buf.split_to(adu_len);
        let crc = adu.split_off(adu_len - CRC_LEN);
        if self.crc_check {
            let crc = u16::from_be_bytes([crc[0], crc[1]]);
            let expected_crc = calc_crc(&adu);
            if expected_crc != crc {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    format!("Invalid CRC: expected = 0x{expected_crc:0>4X}, actual = 0x{crc:0>4X}"),
                ));
            }
        }
        Ok(Some(adu.freeze()))
    }
}

impl Encoder<RequestAdu> for ClientCodec {
    type Error = Error;

    fn encode(&mut self, adu: RequestAdu, buf: &mut BytesMut) -> Result<()> {
        debug_assert_eq!(adu.data().len() + CRC_LEN, adu.tx_length());
        buf.reserve(adu.tx_length());
        let start = buf.len();
        buf.put_slice(adu.data());
        let crc = calc_crc(&buf[start..]);
        buf.put_u16(crc);
        Ok(())
    }
}
