// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # buffer-descriptor
//!
//! Data-only descriptors for strided views over foreign memory.
//!
//! This crate provides:
//! - [`BufferFormat`] - scalar element encodings parsed from format strings.
//! - [`StridedBuffer`] - the immutable descriptor: length, item size, format,
//!   shape, strides, suboffsets, read-only flag and byte offset.
//! - [`init_strides_from_shape`] - the C-order stride derivation used when an
//!   exporter supplies no strides.
//! - Contiguity checks for C and Fortran layouts.
//!
//! # Addressing Model
//! A descriptor never holds a pointer. Every address is an offset delta from
//! the start of the backing region, so the same descriptor can be checked
//! against any region and walked without `unsafe`.

mod descriptor;
mod error;
mod format;
pub mod layout;

pub use descriptor::{DescriptorParts, StridedBuffer};
pub use error::DescriptorError;
pub use format::BufferFormat;
pub use layout::{
    init_fortran_strides_from_shape, init_strides_from_shape, is_c_contiguous,
    is_fortran_contiguous, MAX_DIMENSIONS,
};
