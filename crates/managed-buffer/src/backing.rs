// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Backing stores: where a managed buffer's bytes actually live.

use crate::{BufferError, ExportPin, ManagedBuffer};
use std::fmt;
use std::ops::Range;
use std::ptr::NonNull;
use std::sync::Arc;

/// The storage behind a [`ManagedBuffer`].
pub enum BackingStore {
    /// Runtime-owned bytes.
    Owned(Vec<u8>),
    /// Pinned foreign memory with a teardown action.
    Foreign(ForeignRegion),
    /// A sub-range of another managed buffer, kept pinned while this store
    /// lives.
    Exported(ExportedRange),
}

impl BackingStore {
    /// Wraps foreign memory.
    ///
    /// `teardown` runs exactly once, when the owning buffer is released.
    ///
    /// # Safety
    /// `ptr` must be valid for reads of `len` bytes (and for writes, unless
    /// `read_only`) until `teardown` has been called, and nothing else may
    /// mutate the region while it is readable through the buffer.
    pub unsafe fn foreign(
        ptr: NonNull<u8>,
        len: usize,
        read_only: bool,
        teardown: impl FnOnce() + Send + 'static,
    ) -> Self {
        BackingStore::Foreign(ForeignRegion {
            ptr,
            len,
            read_only,
            teardown: Some(Box::new(teardown)),
        })
    }

    /// Exports `range` of `parent`, pinning it until this store is torn down.
    pub fn export_of(parent: &Arc<ManagedBuffer>, range: Range<usize>) -> Result<Self, BufferError> {
        if range.start > range.end || range.end > parent.len() {
            return Err(BufferError::OutOfRange {
                offset: range.start,
                end: range.end,
                buffer_len: parent.len(),
            });
        }
        let pin = parent.pin()?;
        Ok(BackingStore::Exported(ExportedRange {
            pin,
            offset: range.start,
            len: range.end - range.start,
        }))
    }

    /// Length of the store in bytes.
    pub fn len(&self) -> usize {
        match self {
            BackingStore::Owned(v) => v.len(),
            BackingStore::Foreign(f) => f.len,
            BackingStore::Exported(e) => e.len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if writes through this store are rejected.
    pub fn is_read_only(&self) -> bool {
        match self {
            BackingStore::Owned(_) => false,
            BackingStore::Foreign(f) => f.read_only,
            BackingStore::Exported(e) => e.pin.buffer().is_read_only(),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            BackingStore::Owned(_) => "owned",
            BackingStore::Foreign(_) => "foreign",
            BackingStore::Exported(_) => "exported",
        }
    }

    /// Runs the store's teardown action.
    pub(crate) fn teardown(self) {
        match self {
            BackingStore::Owned(v) => drop(v),
            BackingStore::Foreign(mut f) => {
                if let Some(action) = f.teardown.take() {
                    action();
                }
            }
            // Dropping the pin may release the parent.
            BackingStore::Exported(e) => drop(e),
        }
    }
}

impl fmt::Debug for BackingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackingStore")
            .field("kind", &self.kind())
            .field("len", &self.len())
            .field("read_only", &self.is_read_only())
            .finish()
    }
}

/// Foreign memory handed over by native code.
pub struct ForeignRegion {
    ptr: NonNull<u8>,
    len: usize,
    read_only: bool,
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl ForeignRegion {
    pub(crate) fn as_slice(&self) -> &[u8] {
        // SAFETY: the constructor's contract keeps the region readable until
        // teardown, and teardown consumes the region.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as above; callers check `read_only` first, and the owning
        // buffer hands out `&mut self` only under its write lock.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    pub(crate) fn is_read_only(&self) -> bool {
        self.read_only
    }
}

impl Drop for ForeignRegion {
    fn drop(&mut self) {
        // A region dropped without an explicit release still runs its
        // teardown so foreign memory is never leaked.
        if let Some(action) = self.teardown.take() {
            action();
        }
    }
}

// The raw pointer is only dereferenced under the owning buffer's lock.
unsafe impl Send for ForeignRegion {}
unsafe impl Sync for ForeignRegion {}

/// A pinned sub-range of another managed buffer.
pub struct ExportedRange {
    pin: ExportPin,
    offset: usize,
    len: usize,
}

impl ExportedRange {
    pub(crate) fn parent(&self) -> &Arc<ManagedBuffer> {
        self.pin.buffer()
    }

    pub(crate) fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }
}
