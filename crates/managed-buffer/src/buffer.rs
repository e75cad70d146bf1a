// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The managed buffer and its exactly-once release.
//!
//! A [`ManagedBuffer`] moves through two states:
//!
//! ```text
//! UNRELEASED ──release()──► RELEASED
//! ```
//!
//! The transition is a single compare-and-set, so exactly one caller runs
//! the backing store's teardown no matter how many threads race on
//! `release()`. Losers return `false` immediately.
//!
//! Besides explicit release, the buffer releases itself once it has been
//! referenced at least once and the last [`BufferReference`] has been
//! detached while no [`ExportPin`] holds it.

use crate::registry::RegistryInner;
use crate::{BackingStore, BufferError, BufferReference, ExportPin};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

const UNRELEASED: u8 = 0;
const RELEASED: u8 = 1;

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// Why a buffer's backing store was torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ReleaseCause {
    /// A caller invoked [`ManagedBuffer::release`].
    Explicit,
    /// The last reference detached with no export pinning the buffer.
    Deferred,
    /// The buffer was dropped while still unreleased.
    Dropped,
}

/// Owns (or borrows) a region of memory that views read through.
///
/// Always handled as `Arc<ManagedBuffer>`: views, pins and registry
/// bookkeeping share it.
pub struct ManagedBuffer {
    id: u64,
    len: usize,
    read_only: bool,
    state: AtomicU8,
    store: RwLock<Option<BackingStore>>,
    /// Live, attached [`BufferReference`]s.
    attached: AtomicUsize,
    /// Live [`ExportPin`]s.
    pins: AtomicUsize,
    /// Set by the first attach; unpinning only reclaims viewed buffers.
    ever_attached: AtomicBool,
    registry: Option<Arc<RegistryInner>>,
}

impl ManagedBuffer {
    /// Creates an unregistered buffer over `store`.
    pub fn new(store: BackingStore) -> Arc<Self> {
        Self::with_registry(store, None)
    }

    pub(crate) fn with_registry(store: BackingStore, registry: Option<Arc<RegistryInner>>) -> Arc<Self> {
        let id = NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed);
        let len = store.len();
        let read_only = store.is_read_only();
        tracing::debug!(buffer = id, kind = store.kind(), len, "managed buffer created");
        if let Some(registry) = &registry {
            registry.record_created(len);
        }
        Arc::new(Self {
            id,
            len,
            read_only,
            state: AtomicU8::new(UNRELEASED),
            store: RwLock::new(Some(store)),
            attached: AtomicUsize::new(0),
            pins: AtomicUsize::new(0),
            ever_attached: AtomicBool::new(false),
            registry,
        })
    }

    /// Process-unique identifier, used in logs and errors.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Length of the backing region in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_released(&self) -> bool {
        self.state.load(Ordering::Acquire) == RELEASED
    }

    /// Number of attached references.
    pub fn attached_references(&self) -> usize {
        self.attached.load(Ordering::SeqCst)
    }

    /// Number of live export pins.
    pub fn pin_count(&self) -> usize {
        self.pins.load(Ordering::SeqCst)
    }

    /// Tears down the backing store.
    ///
    /// Returns `true` for the single call that performed the teardown and
    /// `false` for every other call, concurrent or later.
    pub fn release(&self) -> bool {
        self.release_with(ReleaseCause::Explicit)
    }

    fn release_with(&self, cause: ReleaseCause) -> bool {
        if self
            .state
            .compare_exchange(UNRELEASED, RELEASED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::trace!(buffer = self.id, "release: already released");
            if let Some(registry) = &self.registry {
                registry.record_redundant_release();
            }
            return false;
        }

        let store = self
            .store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(store) = store {
            store.teardown();
        }

        if let Some(registry) = &self.registry {
            registry.record_teardown(self.len, cause);
        }
        tracing::debug!(buffer = self.id, ?cause, "managed buffer released");
        true
    }

    /// Runs `f` over the buffer's bytes.
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Result<R, BufferError> {
        let mut f = Some(f);
        let mut out = None;
        self.visit_bytes(&mut |bytes| {
            if let Some(f) = f.take() {
                out = Some(f(bytes));
            }
        })?;
        out.ok_or(BufferError::Released { id: self.id })
    }

    /// Runs `f` over the buffer's bytes mutably.
    pub fn with_bytes_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> Result<R, BufferError> {
        let mut f = Some(f);
        let mut out = None;
        self.visit_bytes_mut(&mut |bytes| {
            if let Some(f) = f.take() {
                out = Some(f(bytes));
            }
        })?;
        out.ok_or(BufferError::Released { id: self.id })
    }

    // Exported stores recurse into their parent. These stay non-generic so
    // the recursion does not instantiate a new closure type per level.
    fn visit_bytes(&self, visit: &mut dyn FnMut(&[u8])) -> Result<(), BufferError> {
        let guard = self.store.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            None => Err(BufferError::Released { id: self.id }),
            Some(BackingStore::Owned(v)) => {
                visit(v.as_slice());
                Ok(())
            }
            Some(BackingStore::Foreign(region)) => {
                visit(region.as_slice());
                Ok(())
            }
            Some(BackingStore::Exported(e)) => {
                let range = e.range();
                e.parent()
                    .visit_bytes(&mut |bytes| visit(&bytes[range.clone()]))
            }
        }
    }

    fn visit_bytes_mut(&self, visit: &mut dyn FnMut(&mut [u8])) -> Result<(), BufferError> {
        if self.read_only {
            return Err(BufferError::ReadOnly { id: self.id });
        }
        let mut guard = self.store.write().unwrap_or_else(PoisonError::into_inner);
        match guard.as_mut() {
            None => Err(BufferError::Released { id: self.id }),
            Some(BackingStore::Owned(v)) => {
                visit(v.as_mut_slice());
                Ok(())
            }
            Some(BackingStore::Foreign(region)) => {
                if region.is_read_only() {
                    return Err(BufferError::ReadOnly { id: self.id });
                }
                visit(region.as_mut_slice());
                Ok(())
            }
            Some(BackingStore::Exported(e)) => {
                let range = e.range();
                e.parent()
                    .visit_bytes_mut(&mut |bytes| visit(&mut bytes[range.clone()]))
            }
        }
    }

    /// Pins the buffer for a native export.
    pub fn pin(self: &Arc<Self>) -> Result<ExportPin, BufferError> {
        if self.is_released() {
            return Err(BufferError::Released { id: self.id });
        }
        self.pins.fetch_add(1, Ordering::SeqCst);
        Ok(ExportPin::new(Arc::clone(self)))
    }

    /// Attaches a new reference (one per view).
    pub fn attach(self: &Arc<Self>) -> Result<BufferReference, BufferError> {
        if self.is_released() {
            return Err(BufferError::Released { id: self.id });
        }
        self.ever_attached.store(true, Ordering::SeqCst);
        self.attached.fetch_add(1, Ordering::SeqCst);
        Ok(BufferReference::new(Arc::clone(self)))
    }

    /// Called when a reference detaches.
    pub(crate) fn on_reference_detached(&self) {
        let previous = self.attached.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "reference count underflow on buffer {}", self.id);
        if previous == 1 && self.pins.load(Ordering::SeqCst) == 0 {
            self.release_with(ReleaseCause::Deferred);
        }
    }

    /// Called when an export pin drops.
    pub(crate) fn on_unpinned(&self) {
        let previous = self.pins.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "pin count underflow on buffer {}", self.id);
        if previous == 1
            && self.attached.load(Ordering::SeqCst) == 0
            && self.ever_attached.load(Ordering::SeqCst)
        {
            self.release_with(ReleaseCause::Deferred);
        }
    }
}

impl Drop for ManagedBuffer {
    fn drop(&mut self) {
        if !self.is_released() {
            self.release_with(ReleaseCause::Dropped);
        }
    }
}

impl std::fmt::Debug for ManagedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedBuffer")
            .field("id", &self.id)
            .field("len", &self.len)
            .field("read_only", &self.read_only)
            .field("released", &self.is_released())
            .field("attached", &self.attached_references())
            .field("pins", &self.pin_count())
            .finish()
    }
}
