// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Release accounting for registered buffers.

use crate::ReleaseCause;

/// Cumulative statistics about buffers created through a
/// [`BufferRegistry`](crate::BufferRegistry).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ReleaseStats {
    /// Buffers registered.
    pub buffers_created: u64,
    /// Bytes registered, including buffers since released.
    pub bytes_created: u64,
    /// Teardowns caused by an explicit `release()`.
    pub explicit_releases: u64,
    /// Teardowns caused by the last reference detaching.
    pub deferred_releases: u64,
    /// Teardowns caused by dropping an unreleased buffer.
    pub dropped_releases: u64,
    /// `release()` calls that lost the race or came too late.
    pub redundant_releases: u64,
    /// High-water mark of live bytes.
    pub peak_live_bytes: usize,
}

impl ReleaseStats {
    /// Total teardowns, whatever the cause.
    pub fn total_releases(&self) -> u64 {
        self.explicit_releases + self.deferred_releases + self.dropped_releases
    }

    pub(crate) fn record_created(&mut self, len: usize) {
        self.buffers_created += 1;
        self.bytes_created += len as u64;
    }

    pub(crate) fn record_teardown(&mut self, cause: ReleaseCause) {
        match cause {
            ReleaseCause::Explicit => self.explicit_releases += 1,
            ReleaseCause::Deferred => self.deferred_releases += 1,
            ReleaseCause::Dropped => self.dropped_releases += 1,
        }
    }

    pub(crate) fn record_redundant(&mut self) {
        self.redundant_releases += 1;
    }

    pub(crate) fn update_peak(&mut self, live_bytes: usize) {
        if live_bytes > self.peak_live_bytes {
            self.peak_live_bytes = live_bytes;
        }
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "buffers: {} ({} bytes), released: {} explicit / {} deferred / {} dropped, \
             redundant: {}, peak live: {} bytes",
            self.buffers_created,
            self.bytes_created,
            self.explicit_releases,
            self.deferred_releases,
            self.dropped_releases,
            self.redundant_releases,
            self.peak_live_bytes,
        )
    }
}
