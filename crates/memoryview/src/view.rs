// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The memory view.
//!
//! # Lifecycle
//!
//! ```text
//! new() ──► export()/release_export() pairs ──► set_released() ──► (all access fails)
//! ```
//!
//! `set_released()` sets `RELEASED`, detaches the view's
//! [`BufferReference`] and clears the owner. Detaching the last reference of
//! a [`ManagedBuffer`] releases it, unless an [`ExportPin`] is holding it.
//!
//! # Thread Safety
//! The descriptor is immutable. Flags, the export counter and the cached hash
//! are atomics; the pointer and owner sit behind mutexes that are only held
//! long enough to clone a handle out.

use crate::access;
use crate::{ExportGuard, ReleasePolicy, ViewError, ViewFlags};
use buffer_descriptor::StridedBuffer;
use managed_buffer::{BufferReference, ExportPin, ManagedBuffer};
use object_model::{ErrorKind, Owner, RaiseHandler, RaisedError};
use std::sync::atomic::{AtomicI64, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Hash sentinel meaning "not computed yet".
pub const HASH_NOT_COMPUTED: i64 = -1;

/// Where a view's bytes come from.
#[derive(Debug)]
pub enum ViewPointer {
    /// A managed buffer, through this view's own reference.
    Managed(BufferReference),
    /// Zero-copy aliasing of an owner's read-only storage.
    Aliased(Arc<[u8]>),
}

/// A multi-dimensional strided view over a memory region.
///
/// # Example
/// ```
/// use buffer_descriptor::StridedBuffer;
/// use managed_buffer::BufferRegistry;
/// use memoryview::MemoryView;
///
/// let registry = BufferRegistry::new();
/// let buffer = registry.adopt((0u8..24).collect());
/// let descriptor = StridedBuffer::c_contiguous("i", vec![2, 3], false).unwrap();
///
/// let view = MemoryView::over(descriptor, &buffer, None).unwrap();
/// assert!(view.is_c_contiguous());
/// assert_eq!(view.read_as_bytes().unwrap().len(), 24);
///
/// view.set_released().unwrap();
/// assert!(view.read_as_bytes().is_err());
/// assert!(buffer.is_released());
/// ```
pub struct MemoryView {
    descriptor: StridedBuffer,
    pointer: Mutex<ViewPointer>,
    owner: Mutex<Option<Owner>>,
    flags: AtomicU8,
    exports: AtomicUsize,
    cached_hash: AtomicI64,
    policy: ReleasePolicy,
}

impl MemoryView {
    /// Builds a view.
    ///
    /// On failure `pointer` is dropped; a managed reference detaches, which
    /// may release its buffer. Use [`over`](Self::over) to keep the buffer
    /// alive when the descriptor is rejected.
    ///
    /// `RELEASED` in `flags` is ignored and `SCALAR` is forced on for
    /// zero-dimensional descriptors. Fails when `SCALAR` is requested for a
    /// non-scalar descriptor, when an aliased region is paired with a writable
    /// descriptor, when a read-only managed buffer is paired with a writable
    /// descriptor, or when the layout reaches outside the backing region.
    pub fn new(
        descriptor: StridedBuffer,
        pointer: ViewPointer,
        owner: Option<Owner>,
        flags: ViewFlags,
    ) -> Result<Self, ViewError> {
        let mut flags = flags - ViewFlags::RELEASED;
        if descriptor.is_scalar() {
            flags |= ViewFlags::SCALAR;
        } else if flags.contains(ViewFlags::SCALAR) {
            return Err(ViewError::InvalidConstruction(format!(
                "SCALAR flag on a {}-dimensional descriptor",
                descriptor.dimensions()
            )));
        }

        let region_len = match &pointer {
            ViewPointer::Managed(reference) => {
                let buffer = reference.buffer().ok_or_else(|| {
                    ViewError::InvalidConstruction("buffer reference is detached".into())
                })?;
                check_buffer(&descriptor, buffer)?;
                buffer.len()
            }
            ViewPointer::Aliased(bytes) => {
                if !descriptor.is_read_only() {
                    return Err(ViewError::InvalidConstruction(
                        "aliased storage requires a read-only view".into(),
                    ));
                }
                bytes.len()
            }
        };
        access::check_extent(&descriptor, region_len)?;

        tracing::trace!(
            dimensions = descriptor.dimensions(),
            length = descriptor.length(),
            flags = ?flags,
            "memoryview created"
        );

        Ok(Self {
            descriptor,
            pointer: Mutex::new(pointer),
            owner: Mutex::new(owner),
            flags: AtomicU8::new(flags.bits()),
            exports: AtomicUsize::new(0),
            cached_hash: AtomicI64::new(HASH_NOT_COMPUTED),
            policy: ReleasePolicy::default(),
        })
    }

    /// Builds a view with layout flags derived from the descriptor.
    pub fn with_inferred_flags(
        descriptor: StridedBuffer,
        pointer: ViewPointer,
        owner: Option<Owner>,
    ) -> Result<Self, ViewError> {
        let flags = ViewFlags::infer(&descriptor);
        Self::new(descriptor, pointer, owner, flags)
    }

    /// Attaches a new reference to `buffer` and builds a view over it.
    ///
    /// The descriptor is checked against the buffer before attaching, so a
    /// rejected descriptor leaves the buffer untouched.
    pub fn over(
        descriptor: StridedBuffer,
        buffer: &Arc<ManagedBuffer>,
        owner: Option<Owner>,
    ) -> Result<Self, ViewError> {
        check_buffer(&descriptor, buffer)?;
        let reference = buffer.attach()?;
        Self::with_inferred_flags(descriptor, ViewPointer::Managed(reference), owner)
    }

    /// Builds a read-only view aliasing `bytes` without a managed buffer.
    pub fn aliased(
        descriptor: StridedBuffer,
        bytes: Arc<[u8]>,
        owner: Option<Owner>,
    ) -> Result<Self, ViewError> {
        Self::with_inferred_flags(descriptor, ViewPointer::Aliased(bytes), owner)
    }

    /// Sets what [`set_released`](Self::set_released) does while exports are
    /// live.
    pub fn with_release_policy(mut self, policy: ReleasePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn release_policy(&self) -> ReleasePolicy {
        self.policy
    }

    pub fn descriptor(&self) -> &StridedBuffer {
        &self.descriptor
    }

    pub fn flags(&self) -> ViewFlags {
        ViewFlags::from_bits_truncate(self.flags.load(Ordering::Acquire))
    }

    pub fn is_released(&self) -> bool {
        self.flags().contains(ViewFlags::RELEASED)
    }

    pub fn is_c_contiguous(&self) -> bool {
        self.flags().contains(ViewFlags::C_CONTIGUOUS)
    }

    pub fn is_fortran_contiguous(&self) -> bool {
        self.flags().contains(ViewFlags::FORTRAN_CONTIGUOUS)
    }

    pub fn is_scalar(&self) -> bool {
        self.flags().contains(ViewFlags::SCALAR)
    }

    pub fn is_read_only(&self) -> bool {
        self.descriptor.is_read_only()
    }

    /// Fails with [`ViewError::Released`] once the view is released.
    pub fn check_released(&self) -> Result<(), ViewError> {
        if self.is_released() {
            return Err(ViewError::Released);
        }
        Ok(())
    }

    /// Like [`check_released`](Self::check_released), but the failure is
    /// produced by `raiser`.
    pub fn check_released_with(&self, raiser: &dyn RaiseHandler) -> Result<(), RaisedError> {
        if self.is_released() {
            return Err(raiser.raise(ErrorKind::ValueError, ViewError::Released.to_string()));
        }
        Ok(())
    }

    /// Number of live native exports.
    pub fn exports(&self) -> usize {
        self.exports.load(Ordering::Acquire)
    }

    /// Increments the export counter and returns the new count.
    ///
    /// Does not check for release; callers do that first.
    pub fn export(&self) -> usize {
        let count = self.exports.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!(exports = count, "export");
        count
    }

    /// Decrements the export counter and returns the new count.
    ///
    /// The counter never goes below zero. Decrementing at zero is a caller
    /// bug: it asserts in debug builds and is ignored otherwise.
    pub fn release_export(&self) -> usize {
        let result = self
            .exports
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        match result {
            Ok(previous) => previous - 1,
            Err(_) => {
                debug_assert!(false, "release_export() without a matching export()");
                tracing::warn!("release_export() called with no outstanding exports");
                0
            }
        }
    }

    /// Releases the view.
    ///
    /// Returns `Ok(true)` if this call released it and `Ok(false)` if it was
    /// already released. Under [`ReleasePolicy::RejectWhileExported`] a view
    /// with live exports is left untouched and
    /// [`ViewError::ExportsOutstanding`] is returned.
    ///
    /// In strict mode the export count is checked again after `RELEASED` is
    /// set. An export that raced in clears the flag again and the call fails,
    /// and [`acquire_export`](Self::acquire_export) re-checks the flag after
    /// counting, so a strict release never completes with an export live.
    pub fn set_released(&self) -> Result<bool, ViewError> {
        if self.is_released() {
            return Ok(false);
        }
        let exports = self.exports();
        if exports > 0 {
            match self.policy {
                ReleasePolicy::RejectWhileExported => {
                    return Err(ViewError::ExportsOutstanding { exports });
                }
                ReleasePolicy::BestEffort => {
                    tracing::warn!(exports, "releasing memoryview with live exports");
                }
            }
        }

        let previous = self
            .flags
            .fetch_or(ViewFlags::RELEASED.bits(), Ordering::SeqCst);
        if ViewFlags::from_bits_truncate(previous).contains(ViewFlags::RELEASED) {
            return Ok(false);
        }
        if self.policy == ReleasePolicy::RejectWhileExported {
            let exports = self.exports.load(Ordering::SeqCst);
            if exports > 0 {
                self.flags
                    .fetch_and(!ViewFlags::RELEASED.bits(), Ordering::SeqCst);
                return Err(ViewError::ExportsOutstanding { exports });
            }
        }

        if let ViewPointer::Managed(reference) =
            &mut *self.pointer.lock().unwrap_or_else(PoisonError::into_inner)
        {
            reference.detach();
        }
        self.owner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        tracing::debug!(length = self.descriptor.length(), "memoryview released");
        Ok(true)
    }

    /// The managed buffer behind this view, or `None` for aliased views and
    /// once the reference has been detached.
    pub fn managed_buffer(&self) -> Option<Arc<ManagedBuffer>> {
        match &*self.pointer.lock().unwrap_or_else(PoisonError::into_inner) {
            ViewPointer::Managed(reference) => reference.buffer().cloned(),
            ViewPointer::Aliased(_) => None,
        }
    }

    /// The owner, or `None` after release.
    pub fn owner(&self) -> Option<Owner> {
        self.owner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get_cached_hash(&self) -> i64 {
        self.cached_hash.load(Ordering::Acquire)
    }

    pub fn set_cached_hash(&self, hash: i64) {
        self.cached_hash.store(hash, Ordering::Release);
    }

    /// Hash of the view's logical bytes, computed on first use and memoized.
    ///
    /// Views with equal content hash equal. Only read-only views are
    /// hashable.
    pub fn content_hash(&self) -> Result<i64, ViewError> {
        self.check_released()?;
        if !self.is_read_only() {
            return Err(ViewError::NotHashable);
        }
        let cached = self.get_cached_hash();
        if cached != HASH_NOT_COMPUTED {
            return Ok(cached);
        }

        let bytes = self.read_as_bytes()?;
        let mut hash = xxhash_rust::xxh3::xxh3_64(&bytes) as i64;
        if hash == HASH_NOT_COMPUTED {
            hash = -2;
        }
        match self.cached_hash.compare_exchange(
            HASH_NOT_COMPUTED,
            hash,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => Ok(hash),
            Err(existing) => Ok(existing),
        }
    }

    /// Runs `f` over the backing region.
    fn with_region<R>(
        &self,
        f: impl FnOnce(&[u8]) -> Result<R, ViewError>,
    ) -> Result<R, ViewError> {
        self.check_released()?;
        match self.source()? {
            Source::Managed(buffer) => buffer.with_bytes(f)?,
            Source::Aliased(bytes) => f(&bytes[..]),
        }
    }

    fn source(&self) -> Result<Source, ViewError> {
        match &*self.pointer.lock().unwrap_or_else(PoisonError::into_inner) {
            ViewPointer::Managed(reference) => reference
                .buffer()
                .cloned()
                .map(Source::Managed)
                .ok_or(ViewError::Released),
            ViewPointer::Aliased(bytes) => Ok(Source::Aliased(Arc::clone(bytes))),
        }
    }

    /// Copies the view's items, in C order, into a contiguous byte vector.
    pub fn read_as_bytes(&self) -> Result<Vec<u8>, ViewError> {
        self.with_region(|region| access::gather(&self.descriptor, region))
    }

    /// Copies out the item at `index`.
    pub fn read_item(&self, index: &[usize]) -> Result<Vec<u8>, ViewError> {
        self.with_region(|region| access::read_item(&self.descriptor, region, index))
    }

    /// Overwrites the item at `index`.
    pub fn write_item(&self, index: &[usize], bytes: &[u8]) -> Result<(), ViewError> {
        self.check_released()?;
        if self.is_read_only() {
            return Err(ViewError::ReadOnly);
        }
        match self.source()? {
            Source::Managed(buffer) => buffer
                .with_bytes_mut(|region| access::write_item(&self.descriptor, region, index, bytes))?,
            Source::Aliased(_) => Err(ViewError::ReadOnly),
        }
    }

    /// Starts a native export.
    ///
    /// The returned guard keeps the export counted and the managed buffer
    /// pinned until dropped.
    pub fn acquire_export(&self) -> Result<ExportGuard<'_>, ViewError> {
        self.check_released()?;
        let pin: Option<ExportPin> = match self.source()? {
            Source::Managed(buffer) => Some(buffer.pin()?),
            Source::Aliased(_) => None,
        };
        self.export();
        if self.flags.load(Ordering::SeqCst) & ViewFlags::RELEASED.bits() != 0 {
            // Released while the export was being counted.
            self.release_export();
            return Err(ViewError::Released);
        }
        Ok(ExportGuard::new(self, pin))
    }
}

/// Checks that a view over `buffer` with `descriptor` would be valid.
fn check_buffer(descriptor: &StridedBuffer, buffer: &ManagedBuffer) -> Result<(), ViewError> {
    if buffer.is_released() {
        return Err(ViewError::Released);
    }
    if buffer.is_read_only() && !descriptor.is_read_only() {
        return Err(ViewError::InvalidConstruction(
            "writable view over a read-only buffer".into(),
        ));
    }
    access::check_extent(descriptor, buffer.len())
}

enum Source {
    Managed(Arc<ManagedBuffer>),
    Aliased(Arc<[u8]>),
}

impl std::fmt::Debug for MemoryView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryView")
            .field("format", &self.descriptor.format_string())
            .field("shape", &self.descriptor.shape())
            .field("strides", &self.descriptor.strides())
            .field("flags", &self.flags())
            .field("exports", &self.exports())
            .finish()
    }
}
