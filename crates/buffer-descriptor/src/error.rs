// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for descriptor construction and addressing.

/// Errors raised while building or indexing a [`crate::StridedBuffer`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    /// More dimensions than [`crate::MAX_DIMENSIONS`].
    #[error("too many dimensions: {dimensions} (maximum is {max})")]
    TooManyDimensions { dimensions: usize, max: usize },

    /// A per-dimension array does not have one entry per dimension.
    #[error("{array} has {actual} entries, expected {expected}")]
    ArrayLengthMismatch {
        array: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Item size of zero.
    #[error("item size must be positive")]
    ZeroItemSize,

    /// The declared item size disagrees with the format's fixed size.
    #[error("item size {actual} does not match format '{format}' (expected {expected})")]
    ItemSizeMismatch {
        format: String,
        expected: usize,
        actual: usize,
    },

    /// A user-defined format was given without an explicit item size.
    #[error("cannot derive the item size of format '{format}'")]
    UnknownItemSize { format: String },

    /// `length` is not `item_size * product(shape)`.
    #[error("length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The byte length of the layout does not fit in `usize`.
    #[error("layout size overflows")]
    LengthOverflow,

    /// An index does not have one component per dimension.
    #[error("index has {actual} components, view has {expected} dimensions")]
    IndexRankMismatch { expected: usize, actual: usize },

    /// An index component is outside its dimension.
    #[error("index {index} out of range for dimension {dimension} of length {len}")]
    IndexOutOfRange {
        dimension: usize,
        index: usize,
        len: usize,
    },
}
