// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for managed buffers.

/// Errors that can occur when accessing or deriving from a managed buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    /// The buffer's backing store has already been torn down.
    #[error("managed buffer {id} has been released")]
    Released { id: u64 },

    /// A write was attempted on a read-only backing store.
    #[error("managed buffer {id} is read-only")]
    ReadOnly { id: u64 },

    /// A byte range does not lie inside the buffer.
    #[error("range {offset}..{end} is outside buffer of {buffer_len} bytes")]
    OutOfRange {
        offset: usize,
        end: usize,
        buffer_len: usize,
    },
}
