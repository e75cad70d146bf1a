// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Capability traits exposed to the host object model.

use crate::{MemoryView, ViewError};

/// Buffer-protocol queries.
pub trait BufferLike: Send + Sync {
    fn is_buffer(&self) -> bool {
        true
    }

    /// Byte length of the logical content.
    fn buffer_length(&self) -> usize;

    /// The logical content as contiguous bytes.
    fn buffer_bytes(&self) -> Result<Vec<u8>, ViewError>;
}

/// Objects that can be explicitly released.
pub trait Releasable: Send + Sync {
    /// Returns `Ok(true)` if this call released the object.
    fn release(&self) -> Result<bool, ViewError>;

    fn is_released(&self) -> bool;
}

impl BufferLike for MemoryView {
    fn buffer_length(&self) -> usize {
        self.descriptor().length()
    }

    fn buffer_bytes(&self) -> Result<Vec<u8>, ViewError> {
        self.read_as_bytes()
    }
}

impl Releasable for MemoryView {
    fn release(&self) -> Result<bool, ViewError> {
        self.set_released()
    }

    fn is_released(&self) -> bool {
        MemoryView::is_released(self)
    }
}
