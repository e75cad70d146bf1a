// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! RAII guard for native exports.

use crate::MemoryView;
use managed_buffer::ExportPin;

/// A live native export of a [`MemoryView`].
///
/// While the guard lives the view's export counter includes it and the
/// managed buffer (if any) is pinned. Dropping it undoes both.
///
/// # Example
/// ```
/// use buffer_descriptor::StridedBuffer;
/// use managed_buffer::BufferRegistry;
/// use memoryview::MemoryView;
///
/// let registry = BufferRegistry::new();
/// let buffer = registry.allocate(8);
/// let view = MemoryView::over(StridedBuffer::bytes(8, false), &buffer, None).unwrap();
///
/// let export = view.acquire_export().unwrap();
/// assert_eq!(view.exports(), 1);
/// drop(export);
/// assert_eq!(view.exports(), 0);
/// ```
pub struct ExportGuard<'a> {
    view: &'a MemoryView,
    pin: Option<ExportPin>,
}

impl<'a> ExportGuard<'a> {
    pub(crate) fn new(view: &'a MemoryView, pin: Option<ExportPin>) -> Self {
        Self { view, pin }
    }

    /// The exported view.
    pub fn view(&self) -> &MemoryView {
        self.view
    }

    /// Returns `true` if a managed buffer is pinned by this export.
    pub fn is_pinned(&self) -> bool {
        self.pin.is_some()
    }
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        self.view.release_export();
        // The pin drops after the counter, so a deferred release of the
        // buffer never sees this export as live.
    }
}

impl std::fmt::Debug for ExportGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportGuard")
            .field("exports", &self.view.exports())
            .field("pinned", &self.is_pinned())
            .finish()
    }
}
