// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! RAII export pin.

use crate::ManagedBuffer;
use std::sync::Arc;

/// Keeps a [`ManagedBuffer`] from being reclaimed by deferred release while
/// native code holds its bytes.
///
/// Dropping the last pin of a buffer whose references have all detached
/// triggers the deferred release. An explicit
/// [`release`](ManagedBuffer::release) is never blocked by pins.
pub struct ExportPin {
    buffer: Arc<ManagedBuffer>,
}

impl ExportPin {
    /// The caller has already incremented the buffer's pin count.
    pub(crate) fn new(buffer: Arc<ManagedBuffer>) -> Self {
        Self { buffer }
    }

    /// The pinned buffer.
    pub fn buffer(&self) -> &Arc<ManagedBuffer> {
        &self.buffer
    }
}

impl Drop for ExportPin {
    fn drop(&mut self) {
        self.buffer.on_unpinned();
    }
}

impl std::fmt::Debug for ExportPin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportPin")
            .field("buffer", &self.buffer.id())
            .finish()
    }
}
