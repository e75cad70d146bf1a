// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Dispatch counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters of one [`ClinicNode`](crate::ClinicNode).
#[derive(Debug, Default)]
pub struct DispatchStats {
    specialized_calls: AtomicU64,
    generic_calls: AtomicU64,
    cast_nodes_created: AtomicU64,
    unexpected_results: AtomicU64,
}

/// A point-in-time copy of [`DispatchStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct DispatchSnapshot {
    /// Calls that went straight to `call_primitive`.
    pub specialized_calls: u64,
    /// Calls through the boxed `call` path.
    pub generic_calls: u64,
    /// Cast nodes built. Never more than one per position.
    pub cast_nodes_created: u64,
    /// Generic results that did not narrow to the requested primitive.
    pub unexpected_results: u64,
}

impl DispatchStats {
    pub(crate) fn record_specialized(&self) {
        self.specialized_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_generic(&self) {
        self.generic_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cast_node(&self) {
        self.cast_nodes_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unexpected(&self) {
        self.unexpected_results.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            specialized_calls: self.specialized_calls.load(Ordering::Relaxed),
            generic_calls: self.generic_calls.load(Ordering::Relaxed),
            cast_nodes_created: self.cast_nodes_created.load(Ordering::Relaxed),
            unexpected_results: self.unexpected_results.load(Ordering::Relaxed),
        }
    }
}

impl DispatchSnapshot {
    /// Fraction of calls that took the specialized path, in `[0.0, 1.0]`.
    ///
    /// Returns `0.0` if nothing has been dispatched.
    pub fn specialization_ratio(&self) -> f64 {
        let total = self.specialized_calls + self.generic_calls;
        if total == 0 {
            return 0.0;
        }
        self.specialized_calls as f64 / total as f64
    }
}
