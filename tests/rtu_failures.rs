// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Execute this test only if `rtu` feature is selected.

#![cfg(feature = "rtu")]

mod device;

use std::{io, sync::Arc, thread, time::Duration};

use modbus_io::{
    report::{Alarm, Deferred},
    transport::rtu::RtuTransport,
    CommandParameters, Decoded, Error, ExceptionCode, Field, ModbusIo, Phase, ProtocolFailure,
    ResultSlot, ValidationError,
};
use tokio::io::DuplexStream;

use crate::device::{init_logger, spawn_device, with_crc, Answer, Host};

fn modbus_io(client: DuplexStream) -> ModbusIo<RtuTransport<DuplexStream>, Host> {
    let transport = RtuTransport::new(client)
        .unwrap()
        .with_timeout(Duration::from_millis(100));
    ModbusIo::new(transport, Host::default(), Arc::new(ResultSlot::new(42)))
}

#[test]
fn exception_response() {
    init_logger();
    let (client, server) = tokio::io::duplex(64);
    let device = spawn_device(server, vec![Answer::Frame(with_crc(&[0x02, 0x83, 0x02]))]);
    let mut mbio = modbus_io(client);
    mbio.set_phase(Phase::Running);

    let err = mbio
        .execute(&CommandParameters::new(2.0, 3.0, 254.0))
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Protocol(ProtocolFailure::ExceptionCallback(
            ExceptionCode::IllegalDataAddress
        ))
    ));
    assert_eq!(mbio.slot().get(), 42);
    assert_eq!(mbio.reporter().alarms, [Alarm::InvalidResult]);
    assert_eq!(mbio.reporter().queue.len(), 1);

    mbio.reporter_mut().run_queue();
    assert_eq!(mbio.reporter().warnings.len(), 1);
    assert!(mbio.reporter().warnings[0].starts_with("MODBUS ERROR"));

    device.join().unwrap();
}

#[test]
fn unexpected_discrete_input_state() {
    init_logger();
    let (client, server) = tokio::io::duplex(64);
    let device = spawn_device(
        server,
        vec![Answer::Frame(with_crc(&[0x02, 0x02, 0x01, 0x02]))],
    );
    let mut mbio = modbus_io(client);
    mbio.set_phase(Phase::Running);

    let err = mbio
        .execute(&CommandParameters::new(2.0, 2.0, 1.0))
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Protocol(ProtocolFailure::UnexpectedPayload { value: 0x02, .. })
    ));
    assert_eq!(mbio.slot().get(), 42);
    assert_eq!(mbio.reporter().alarms.len(), 1);

    device.join().unwrap();
}

#[test]
fn timeout_during_startup_defers_the_alarm() {
    init_logger();
    let (client, server) = tokio::io::duplex(64);
    let device = spawn_device(
        server,
        vec![
            Answer::Silence,
            Answer::Frame(with_crc(&[0x02, 0x04, 0x02, 0x00, 0x05])),
        ],
    );
    let mut mbio = modbus_io(client);

    let err = mbio
        .execute(&CommandParameters::new(2.0, 4.0, 1.0))
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Protocol(ProtocolFailure::Transport(ref err)) if err.kind() == io::ErrorKind::TimedOut
    ));
    assert!(mbio.reporter().alarms.is_empty());
    assert_eq!(
        mbio.reporter().queue,
        [Deferred::RaiseAlarm(Alarm::InvalidResult)]
    );

    mbio.reporter_mut().run_queue();
    assert_eq!(mbio.reporter().alarms, [Alarm::InvalidResult]);
    assert!(mbio.reporter().warnings.is_empty());

    // Ready for the next command
    let decoded = mbio
        .execute(&CommandParameters::new(2.0, 4.0, 1.0))
        .unwrap();
    assert_eq!(decoded, Decoded::Value(5));
    assert_eq!(mbio.slot().get(), 5);

    device.join().unwrap();
}

#[test]
fn late_response_is_not_taken_for_the_next_one() {
    init_logger();
    let (client, server) = tokio::io::duplex(64);
    let device = spawn_device(
        server,
        vec![
            Answer::Late(
                Duration::from_millis(200),
                with_crc(&[0x02, 0x03, 0x02, 0x01, 0x2C]),
            ),
            Answer::Frame(with_crc(&[0x02, 0x03, 0x02, 0x00, 0x07])),
        ],
    );
    let mut mbio = modbus_io(client);
    mbio.set_phase(Phase::Running);

    let err = mbio
        .execute(&CommandParameters::new(2.0, 3.0, 254.0))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Protocol(ProtocolFailure::Transport(ref err)) if err.kind() == io::ErrorKind::TimedOut
    ));

    // Let the late response arrive before the next request.
    thread::sleep(Duration::from_millis(300));

    let decoded = mbio
        .execute(&CommandParameters::new(2.0, 3.0, 255.0))
        .unwrap();
    assert_eq!(decoded, Decoded::Value(7));
    assert_eq!(mbio.slot().get(), 7);

    device.join().unwrap();
}

#[test]
fn invalid_crc() {
    init_logger();
    let (client, server) = tokio::io::duplex(64);
    let device = spawn_device(
        server,
        vec![
            Answer::Frame(vec![0x02, 0x01, 0x01, 0x07, 0x00, 0x00]),
            Answer::Frame(with_crc(&[0x02, 0x03, 0x02, 0x01, 0x2C])),
            Answer::Frame(with_crc(&[0x02, 0x04, 0x02, 0x00, 0x05])),
        ],
    );
    let mut mbio = modbus_io(client);
    mbio.set_phase(Phase::Running);

    let err = mbio
        .execute(&CommandParameters::new(2.0, 1.0, 1.0).with_value(4.0))
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Protocol(ProtocolFailure::Transport(ref err)) if err.kind() == io::ErrorKind::InvalidData
    ));
    assert_eq!(mbio.slot().get(), 42);

    // Every following command gets its own response
    let decoded = mbio
        .execute(&CommandParameters::new(2.0, 3.0, 254.0))
        .unwrap();
    assert_eq!(decoded, Decoded::Value(300));
    assert_eq!(mbio.slot().get(), 300);

    let decoded = mbio
        .execute(&CommandParameters::new(2.0, 4.0, 1.0))
        .unwrap();
    assert_eq!(decoded, Decoded::Value(5));
    assert_eq!(mbio.slot().get(), 5);

    device.join().unwrap();
}

#[test]
fn rejected_commands_are_not_sent() {
    init_logger();
    let (client, server) = tokio::io::duplex(64);
    let device = spawn_device(
        server,
        vec![Answer::Frame(with_crc(&[0x02, 0x01, 0x01, 0x01]))],
    );
    let mut mbio = modbus_io(client);
    mbio.set_phase(Phase::Running);

    let missing_function = CommandParameters {
        device: Some(300.0),
        function: None,
        register: Some(1.0),
        value: None,
    };
    assert!(matches!(
        mbio.execute(&missing_function),
        Err(Error::Validation(ValidationError::BadNumberFormat(
            Field::Function
        )))
    ));
    assert!(matches!(
        mbio.execute(&CommandParameters::new(2.0, 7.0, 1.0)),
        Err(Error::Validation(ValidationError::ValueOutOfRange(
            Field::Function
        )))
    ));
    assert!(mbio.reporter().alarms.is_empty());
    assert!(mbio.reporter().queue.is_empty());

    // The first request the device sees is the valid one.
    let decoded = mbio
        .execute(&CommandParameters::new(2.0, 1.0, 1.0))
        .unwrap();
    assert_eq!(decoded, Decoded::Value(1));

    let (requests, _) = device.join().unwrap();
    assert_eq!(requests, [with_crc(&[0x02, 0x01, 0x00, 0x00, 0x00, 0x01])]);
}
