// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime counters.
//!
//! [`RuntimeMetrics`] is a serializable snapshot of what a
//! [`ViewRuntime`](crate::ViewRuntime) has done: views created and
//! released, bytes materialized, and the buffer registry's release stats.

use managed_buffer::ReleaseStats;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct Counters {
    views_created: AtomicU64,
    views_released: AtomicU64,
    bytes_materialized: AtomicU64,
    release_errors: AtomicU64,
}

impl Counters {
    pub(crate) fn view_created(&self) {
        self.views_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn view_released(&self) {
        self.views_released.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn bytes_materialized(&self, n: usize) {
        self.bytes_materialized.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub(crate) fn release_error(&self) {
        self.release_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, buffers: Option<ReleaseStats>) -> RuntimeMetrics {
        RuntimeMetrics {
            views_created: self.views_created.load(Ordering::Relaxed),
            views_released: self.views_released.load(Ordering::Relaxed),
            bytes_materialized: self.bytes_materialized.load(Ordering::Relaxed),
            release_errors: self.release_errors.load(Ordering::Relaxed),
            buffers,
        }
    }
}

/// Snapshot of runtime activity.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct RuntimeMetrics {
    /// Views constructed through the runtime.
    pub views_created: u64,
    /// Views released through the runtime.
    pub views_released: u64,
    /// Bytes copied out by `read_bytes`.
    pub bytes_materialized: u64,
    /// Release requests that were refused.
    pub release_errors: u64,
    /// Buffer registry stats, when tracking is enabled.
    pub buffers: Option<ReleaseStats>,
}

impl RuntimeMetrics {
    /// Views created and not yet released through the runtime.
    pub fn views_outstanding(&self) -> u64 {
        self.views_created.saturating_sub(self.views_released)
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "views: {} created, {} released, {} outstanding; {} bytes materialized",
            self.views_created,
            self.views_released,
            self.views_outstanding(),
            self.bytes_materialized,
        );
        if self.release_errors > 0 {
            out.push_str(&format!("; {} refused releases", self.release_errors));
        }
        if let Some(buffers) = &self.buffers {
            out.push_str("; ");
            out.push_str(&buffers.summary());
        }
        out
    }
}
