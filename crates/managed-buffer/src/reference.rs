// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Back-references from views to their managed buffer.
//!
//! A [`BufferReference`] is the only path by which "this view no longer
//! needs the buffer" reaches the [`ManagedBuffer`]. It detaches on one of two
//! triggers:
//!
//! 1. An explicit [`detach`](BufferReference::detach), issued when the owning
//!    view is released.
//! 2. `Drop`, when the owning view goes away without an explicit release.
//!
//! Either way the buffer hears about it exactly once, and the detach of the
//! last reference releases the buffer unless an [`ExportPin`](crate::ExportPin)
//! still holds it.

use crate::ManagedBuffer;
use std::sync::Arc;

/// A view's handle on its [`ManagedBuffer`].
pub struct BufferReference {
    /// `None` once detached.
    buffer: Option<Arc<ManagedBuffer>>,
}

impl BufferReference {
    /// The caller has already counted this reference as attached.
    pub(crate) fn new(buffer: Arc<ManagedBuffer>) -> Self {
        Self {
            buffer: Some(buffer),
        }
    }

    /// Attaches a new reference to `buffer`.
    ///
    /// Equivalent to [`ManagedBuffer::attach`].
    pub fn attach(buffer: &Arc<ManagedBuffer>) -> Result<Self, crate::BufferError> {
        buffer.attach()
    }

    /// The referenced buffer, or `None` once detached.
    pub fn buffer(&self) -> Option<&Arc<ManagedBuffer>> {
        self.buffer.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.buffer.is_some()
    }

    /// Detaches from the buffer.
    ///
    /// Returns `true` if this call detached, `false` if the reference was
    /// already detached.
    pub fn detach(&mut self) -> bool {
        match self.buffer.take() {
            Some(buffer) => {
                tracing::trace!(buffer = buffer.id(), "reference detached");
                buffer.on_reference_detached();
                true
            }
            None => false,
        }
    }
}

impl Drop for BufferReference {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for BufferReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferReference")
            .field("buffer", &self.buffer.as_ref().map(|b| b.id()))
            .finish()
    }
}
