// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Buffer registry with live-byte and release accounting.
//!
//! A [`BufferRegistry`] is a factory for [`ManagedBuffer`]s. Every buffer it
//! creates holds an `Arc` back to the registry's inner state, so teardown
//! (explicit, deferred or on drop) is reported without the buffer needing a
//! reference to the registry itself.
//!
//! ```text
//! BufferRegistry::allocate(len)
//!       │
//!       ▼
//!  Arc<ManagedBuffer>  ◄─── holds Arc<RegistryInner>
//!       │
//!       │  release() / last detach / drop
//!       ▼
//!  RegistryInner::record_teardown()  ──► live counters, ReleaseStats
//! ```

use crate::{BackingStore, BufferError, ManagedBuffer, ReleaseCause, ReleaseStats};
use std::ops::Range;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared registry state, held by every buffer the registry creates.
pub struct RegistryInner {
    live_buffers: AtomicUsize,
    live_bytes: AtomicUsize,
    stats: Mutex<ReleaseStats>,
}

impl RegistryInner {
    pub(crate) fn record_created(&self, len: usize) {
        self.live_buffers.fetch_add(1, Ordering::AcqRel);
        let live = self.live_bytes.fetch_add(len, Ordering::AcqRel) + len;
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_created(len);
            stats.update_peak(live);
        }
    }

    pub(crate) fn record_teardown(&self, len: usize, cause: ReleaseCause) {
        self.live_buffers.fetch_sub(1, Ordering::AcqRel);
        self.live_bytes.fetch_sub(len, Ordering::AcqRel);
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_teardown(cause);
        }
    }

    pub(crate) fn record_redundant_release(&self) {
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_redundant();
        }
    }
}

/// Creates managed buffers and tracks how they are released.
///
/// # Example
/// ```
/// use managed_buffer::BufferRegistry;
///
/// let registry = BufferRegistry::new();
/// let buffer = registry.allocate(1024);
/// assert_eq!(registry.live_bytes(), 1024);
///
/// assert!(buffer.release());
/// assert_eq!(registry.live_bytes(), 0);
/// assert_eq!(registry.stats().explicit_releases, 1);
/// ```
#[derive(Clone)]
pub struct BufferRegistry {
    inner: Arc<RegistryInner>,
}

impl BufferRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                live_buffers: AtomicUsize::new(0),
                live_bytes: AtomicUsize::new(0),
                stats: Mutex::new(ReleaseStats::default()),
            }),
        }
    }

    /// Registers a buffer over an arbitrary backing store.
    pub fn register(&self, store: BackingStore) -> Arc<ManagedBuffer> {
        ManagedBuffer::with_registry(store, Some(Arc::clone(&self.inner)))
    }

    /// Allocates a zero-filled, runtime-owned buffer of `len` bytes.
    pub fn allocate(&self, len: usize) -> Arc<ManagedBuffer> {
        self.register(BackingStore::Owned(vec![0u8; len]))
    }

    /// Takes ownership of `bytes`.
    pub fn adopt(&self, bytes: Vec<u8>) -> Arc<ManagedBuffer> {
        self.register(BackingStore::Owned(bytes))
    }

    /// Registers foreign memory. `teardown` runs once, on release.
    ///
    /// # Safety
    /// Same contract as [`BackingStore::foreign`].
    pub unsafe fn adopt_foreign(
        &self,
        ptr: NonNull<u8>,
        len: usize,
        read_only: bool,
        teardown: impl FnOnce() + Send + 'static,
    ) -> Arc<ManagedBuffer> {
        self.register(BackingStore::foreign(ptr, len, read_only, teardown))
    }

    /// Exports `range` of `parent` as a new buffer that pins the parent.
    pub fn export(
        &self,
        parent: &Arc<ManagedBuffer>,
        range: Range<usize>,
    ) -> Result<Arc<ManagedBuffer>, BufferError> {
        let store = BackingStore::export_of(parent, range)?;
        Ok(self.register(store))
    }

    /// Number of registered buffers not yet torn down.
    pub fn live_buffers(&self) -> usize {
        self.inner.live_buffers.load(Ordering::Acquire)
    }

    /// Bytes held by registered buffers not yet torn down.
    pub fn live_bytes(&self) -> usize {
        self.inner.live_bytes.load(Ordering::Acquire)
    }

    /// Returns a snapshot of release statistics.
    pub fn stats(&self) -> ReleaseStats {
        self.inner
            .stats
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

impl Default for BufferRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BufferRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferRegistry")
            .field("live_buffers", &self.live_buffers())
            .field("live_bytes", &self.live_bytes())
            .finish()
    }
}
