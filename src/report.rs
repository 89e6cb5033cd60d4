// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporting of protocol failures to the host

use std::fmt;

use crate::error::ProtocolFailure;

/// Program phase of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Cold start. The foreground task queue is not processed yet and
    /// alarms must not be raised directly.
    #[default]
    Startup,
    /// Normal operation.
    Running,
}

/// Alarm kinds raised by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alarm {
    /// A command did not produce a valid result.
    InvalidResult,
}

impl fmt::Display for Alarm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidResult => f.write_str("invalid result"),
        }
    }
}

/// Work handed to the host's foreground task queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    RaiseAlarm(Alarm),
    Warning(String),
}

impl Deferred {
    /// Execute the task once the host processes its queue.
    pub fn run<R: Reporter + ?Sized>(self, reporter: &mut R) {
        match self {
            Self::RaiseAlarm(alarm) => reporter.raise_alarm(alarm),
            Self::Warning(message) => reporter.warn(&message),
        }
    }
}

/// Alarm and message facilities of the host.
pub trait Reporter {
    /// Raise an alarm immediately.
    fn raise_alarm(&mut self, alarm: Alarm);

    /// Queue a task for the foreground task queue.
    fn enqueue_deferred(&mut self, task: Deferred);

    /// Display a warning message.
    fn warn(&mut self, message: &str);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn raise_alarm(&mut self, alarm: Alarm) {
        (**self).raise_alarm(alarm);
    }

    fn enqueue_deferred(&mut self, task: Deferred) {
        (**self).enqueue_deferred(task);
    }

    fn warn(&mut self, message: &str) {
        (**self).warn(message);
    }
}

/// Surface a protocol failure as an alarm.
///
/// During startup the alarm is queued. Afterwards it is raised immediately
/// and a warning message is queued for display.
pub fn report_failure<R: Reporter + ?Sized>(
    reporter: &mut R,
    phase: Phase,
    failure: &ProtocolFailure,
) {
    log::warn!("MODBUS ERROR: {failure}");
    match phase {
        Phase::Startup => reporter.enqueue_deferred(Deferred::RaiseAlarm(Alarm::InvalidResult)),
        Phase::Running => {
            reporter.raise_alarm(Alarm::InvalidResult);
            reporter.enqueue_deferred(Deferred::Warning(format!("MODBUS ERROR: {failure}")));
        }
    }
}
