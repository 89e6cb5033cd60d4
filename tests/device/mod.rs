// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{
    thread::{self, JoinHandle},
    time::Duration,
};

use modbus_io::report::{Alarm, Deferred, Reporter};
use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _, DuplexStream};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// CRC-16/MODBUS, low byte first on the wire.
pub fn crc(data: &[u8]) -> [u8; 2] {
    let mut crc: u16 = 0xFFFF;
    for byte in data {
        crc ^= u16::from(*byte);
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc.to_le_bytes()
}

pub fn with_crc(data: &[u8]) -> Vec<u8> {
    let mut frame = data.to_vec();
    frame.extend_from_slice(&crc(data));
    frame
}

/// What the simulated device does after it has received a request.
#[allow(dead_code)]
pub enum Answer {
    Frame(Vec<u8>),
    /// Send the frame after a delay.
    Late(Duration, Vec<u8>),
    Silence,
}

/// Simulated slave device on the other end of an in-memory stream.
///
/// Returns the received requests and keeps the stream open until joined.
pub fn spawn_device(
    mut stream: DuplexStream,
    answers: Vec<Answer>,
) -> JoinHandle<(Vec<Vec<u8>>, DuplexStream)> {
    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let mut requests = vec![];
            for answer in answers {
                let mut request = [0; 8];
                stream.read_exact(&mut request).await.unwrap();
                requests.push(request.to_vec());
                match answer {
                    Answer::Frame(frame) => stream.write_all(&frame).await.unwrap(),
                    Answer::Late(delay, frame) => {
                        tokio::time::sleep(delay).await;
                        stream.write_all(&frame).await.unwrap();
                    }
                    Answer::Silence => {}
                }
            }
            (requests, stream)
        })
    })
}

#[derive(Debug, Default)]
pub struct Host {
    pub alarms: Vec<Alarm>,
    pub queue: Vec<Deferred>,
    pub warnings: Vec<String>,
}

impl Host {
    /// Process the foreground task queue.
    #[allow(dead_code)]
    pub fn run_queue(&mut self) {
        for task in std::mem::take(&mut self.queue) {
            task.run(self);
        }
    }
}

impl Reporter for Host {
    fn raise_alarm(&mut self, alarm: Alarm) {
        self.alarms.push(alarm);
    }

    fn enqueue_deferred(&mut self, task: Deferred) {
        self.queue.push(task);
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_owned());
    }
}
