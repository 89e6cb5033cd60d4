// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The shared result of the last read

use std::sync::atomic::{AtomicI32, Ordering};

/// Holds the most recently decoded value.
///
/// Only the response decoder writes, from within the blocking call that
/// sent the request. The host reads at any later time, e.g. from a macro
/// that runs after the command. An atomic keeps both sides sound without
/// a lock should that lifecycle ever be relaxed.
#[derive(Debug, Default)]
pub struct ResultSlot(AtomicI32);

impl ResultSlot {
    #[must_use]
    pub const fn new(initial: i32) -> Self {
        Self(AtomicI32::new(initial))
    }

    #[must_use]
    pub fn get(&self) -> i32 {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn set(&self, value: i32) {
        self.0.store(value, Ordering::Release);
    }
}
