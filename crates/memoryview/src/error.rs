// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for memory views.

use buffer_descriptor::DescriptorError;
use managed_buffer::BufferError;
use object_model::{ErrorKind, RaisedError};

/// Message used for every access to a released view.
pub const RELEASED_MESSAGE: &str = "operation forbidden on released buffer";

/// Errors raised by [`MemoryView`](crate::MemoryView) operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewError {
    /// The view has been released.
    #[error("operation forbidden on released buffer")]
    Released,

    /// A write was attempted through a read-only view.
    #[error("cannot modify read-only memory")]
    ReadOnly,

    /// Only read-only views can be hashed.
    #[error("cannot hash writable memoryview object")]
    NotHashable,

    /// `set_released()` was refused because native exports are live.
    #[error("memoryview has {exports} exported buffer(s)")]
    ExportsOutstanding { exports: usize },

    /// The view's construction arguments are inconsistent.
    #[error("invalid memoryview: {0}")]
    InvalidConstruction(String),

    /// An item or stored pointer lies outside the backing region.
    #[error("offset {offset} with {len} byte(s) is outside a region of {region_len} bytes")]
    OutOfBounds {
        offset: isize,
        len: usize,
        region_len: usize,
    },

    /// An item write supplied the wrong number of bytes.
    #[error("item must be {expected} bytes, got {actual}")]
    ItemLength { expected: usize, actual: usize },

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    Buffer(#[from] BufferError),

    /// A failure routed through a raise callback.
    #[error(transparent)]
    Raised(#[from] RaisedError),
}

impl ViewError {
    /// The runtime exception kind this error surfaces as.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ViewError::Released
            | ViewError::NotHashable
            | ViewError::InvalidConstruction(_)
            | ViewError::ItemLength { .. }
            | ViewError::Descriptor(_) => ErrorKind::ValueError,
            ViewError::ReadOnly => ErrorKind::TypeError,
            ViewError::ExportsOutstanding { .. } | ViewError::OutOfBounds { .. } => {
                ErrorKind::BufferError
            }
            ViewError::Buffer(BufferError::Released { .. }) => ErrorKind::ValueError,
            ViewError::Buffer(BufferError::ReadOnly { .. }) => ErrorKind::TypeError,
            ViewError::Buffer(BufferError::OutOfRange { .. }) => ErrorKind::BufferError,
            ViewError::Raised(e) => e.kind(),
        }
    }
}
