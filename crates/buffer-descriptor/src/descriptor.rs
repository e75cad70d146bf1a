// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The strided buffer descriptor.

use crate::layout::{self, MAX_DIMENSIONS};
use crate::{BufferFormat, DescriptorError};

/// Raw construction parameters for a [`StridedBuffer`].
///
/// This mirrors what an exporter hands over through the buffer protocol.
/// `strides: None` selects the C-contiguous derivation
/// ([`init_strides_from_shape`](crate::init_strides_from_shape)).
#[derive(Debug, Clone, Default)]
pub struct DescriptorParts {
    pub length: usize,
    pub read_only: bool,
    pub item_size: usize,
    pub format_string: String,
    pub shape: Vec<usize>,
    pub strides: Option<Vec<isize>>,
    pub suboffsets: Vec<isize>,
    pub byte_offset: usize,
}

/// Immutable description of a strided view over a memory region.
///
/// Item `(i0, .., in)` lives at
/// `byte_offset + i0 * strides[0] + .. + in * strides[n]` relative to the
/// start of the backing region, with pointer indirection applied for
/// dimensions whose suboffset is non-negative.
///
/// # Examples
/// ```
/// use buffer_descriptor::StridedBuffer;
/// let d = StridedBuffer::c_contiguous("i", vec![2, 3], false).unwrap();
/// assert_eq!(d.strides(), &[12, 4]);
/// assert_eq!(d.length(), 24);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StridedBuffer {
    length: usize,
    item_size: usize,
    format: BufferFormat,
    format_string: String,
    shape: Vec<usize>,
    strides: Vec<isize>,
    suboffsets: Vec<isize>,
    read_only: bool,
    byte_offset: usize,
}

impl StridedBuffer {
    /// Validates `parts` and builds a descriptor.
    pub fn from_parts(parts: DescriptorParts) -> Result<Self, DescriptorError> {
        let dimensions = parts.shape.len();
        if dimensions > MAX_DIMENSIONS {
            return Err(DescriptorError::TooManyDimensions {
                dimensions,
                max: MAX_DIMENSIONS,
            });
        }
        if parts.item_size == 0 {
            return Err(DescriptorError::ZeroItemSize);
        }

        let format = BufferFormat::from_format_string(&parts.format_string);
        if let Some(expected) = format.item_size() {
            if expected != parts.item_size {
                return Err(DescriptorError::ItemSizeMismatch {
                    format: parts.format_string,
                    expected,
                    actual: parts.item_size,
                });
            }
        }

        let expected_length = parts
            .shape
            .iter()
            .try_fold(parts.item_size, |acc, &d| acc.checked_mul(d))
            .filter(|&n| n <= isize::MAX as usize)
            .ok_or(DescriptorError::LengthOverflow)?;
        if expected_length != parts.length {
            return Err(DescriptorError::LengthMismatch {
                expected: expected_length,
                actual: parts.length,
            });
        }

        let strides = match parts.strides {
            Some(strides) => strides,
            None => layout::init_strides_from_shape(parts.item_size, &parts.shape)?,
        };
        check_len("strides", dimensions, strides.len())?;
        if !parts.suboffsets.is_empty() {
            check_len("suboffsets", dimensions, parts.suboffsets.len())?;
        }

        let descriptor = Self {
            length: parts.length,
            item_size: parts.item_size,
            format,
            format_string: parts.format_string,
            shape: parts.shape,
            strides,
            suboffsets: parts.suboffsets,
            read_only: parts.read_only,
            byte_offset: parts.byte_offset,
        };
        // Direct layouts must have an extent that fits in `isize`.
        descriptor.byte_extent()?;
        Ok(descriptor)
    }

    /// Builds a C-contiguous descriptor for a native format code.
    pub fn c_contiguous(
        format_string: &str,
        shape: Vec<usize>,
        read_only: bool,
    ) -> Result<Self, DescriptorError> {
        let item_size = BufferFormat::from_format_string(format_string)
            .item_size()
            .ok_or_else(|| DescriptorError::UnknownItemSize {
                format: format_string.to_string(),
            })?;
        let length = shape
            .iter()
            .try_fold(item_size, |acc, &d| acc.checked_mul(d))
            .ok_or(DescriptorError::LengthOverflow)?;
        Self::from_parts(DescriptorParts {
            length,
            read_only,
            item_size,
            format_string: format_string.to_string(),
            shape,
            strides: None,
            suboffsets: Vec::new(),
            byte_offset: 0,
        })
    }

    /// A flat, one-dimensional view of `len` unsigned bytes.
    pub fn bytes(len: usize, read_only: bool) -> Self {
        Self {
            length: len,
            item_size: 1,
            format: BufferFormat::UInt8,
            format_string: "B".to_string(),
            shape: vec![len],
            strides: vec![1],
            suboffsets: Vec::new(),
            read_only,
            byte_offset: 0,
        }
    }

    /// A zero-dimensional view of a single item.
    pub fn scalar(format_string: &str, read_only: bool) -> Result<Self, DescriptorError> {
        Self::c_contiguous(format_string, Vec::new(), read_only)
    }

    /// Returns a copy of this descriptor starting `byte_offset` bytes into
    /// the backing region.
    pub fn with_byte_offset(mut self, byte_offset: usize) -> Self {
        self.byte_offset = byte_offset;
        self
    }

    /// Total byte length of the logical content.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Bytes per element.
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// Parsed element format.
    pub fn format(&self) -> BufferFormat {
        self.format
    }

    /// Raw format string as supplied by the exporter.
    pub fn format_string(&self) -> &str {
        &self.format_string
    }

    /// Number of dimensions.
    pub fn dimensions(&self) -> usize {
        self.shape.len()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Per-dimension suboffsets; empty when no dimension is indirect.
    pub fn suboffsets(&self) -> &[isize] {
        &self.suboffsets
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Offset of item `(0, .., 0)` from the start of the backing region.
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Number of items (1 for a scalar).
    pub fn num_items(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    /// Returns `true` if any dimension dereferences a stored pointer.
    pub fn has_indirection(&self) -> bool {
        layout::has_indirection(&self.suboffsets)
    }

    pub fn is_c_contiguous(&self) -> bool {
        layout::is_c_contiguous(self.item_size, &self.shape, &self.strides, &self.suboffsets)
    }

    pub fn is_fortran_contiguous(&self) -> bool {
        layout::is_fortran_contiguous(self.item_size, &self.shape, &self.strides, &self.suboffsets)
    }

    /// Returns `[lowest, one-past-highest)` byte offsets touched by this
    /// layout, relative to the start of the backing region.
    ///
    /// Returns `Ok(None)` for indirect layouts, whose extent depends on
    /// stored pointers, and [`DescriptorError::LengthOverflow`] when an
    /// offset does not fit in `isize`.
    pub fn byte_extent(&self) -> Result<Option<(isize, isize)>, DescriptorError> {
        if self.has_indirection() {
            return Ok(None);
        }
        let start = layout::to_isize(self.byte_offset)?;
        if self.num_items() == 0 {
            return Ok(Some((start, start)));
        }
        let mut lo = start;
        let mut hi = start;
        for (&dim, &stride) in self.shape.iter().zip(&self.strides) {
            let span = (layout::to_isize(dim)? - 1)
                .checked_mul(stride)
                .ok_or(DescriptorError::LengthOverflow)?;
            if span < 0 {
                lo = checked_add(lo, span)?;
            } else {
                hi = checked_add(hi, span)?;
            }
        }
        let end = checked_add(hi, layout::to_isize(self.item_size)?)?;
        Ok(Some((lo, end)))
    }

    /// Computes the byte offset of the item at `index`.
    ///
    /// `deref` resolves an indirect dimension: it receives the offset of a
    /// stored pointer and returns the offset that pointer designates.
    pub fn item_offset_with<E>(
        &self,
        index: &[usize],
        mut deref: impl FnMut(isize) -> Result<isize, E>,
    ) -> Result<isize, E>
    where
        E: From<DescriptorError>,
    {
        if index.len() != self.dimensions() {
            return Err(DescriptorError::IndexRankMismatch {
                expected: self.dimensions(),
                actual: index.len(),
            }
            .into());
        }
        let mut offset = layout::to_isize(self.byte_offset)?;
        for (dim, &i) in index.iter().enumerate() {
            let len = self.shape[dim];
            if i >= len {
                return Err(DescriptorError::IndexOutOfRange {
                    dimension: dim,
                    index: i,
                    len,
                }
                .into());
            }
            offset = step(offset, i, self.strides[dim])?;
            if let Some(&sub) = self.suboffsets.get(dim) {
                if sub >= 0 {
                    offset = checked_add(deref(offset)?, sub)?;
                }
            }
        }
        Ok(offset)
    }

    /// Visits the byte offset of every item in C (row-major) order.
    pub fn for_each_item_offset<E>(
        &self,
        mut deref: impl FnMut(isize) -> Result<isize, E>,
        mut visit: impl FnMut(isize) -> Result<(), E>,
    ) -> Result<(), E>
    where
        E: From<DescriptorError>,
    {
        let start = layout::to_isize(self.byte_offset)?;
        self.walk(0, start, &mut deref, &mut visit)
    }

    fn walk<E: From<DescriptorError>>(
        &self,
        dim: usize,
        offset: isize,
        deref: &mut dyn FnMut(isize) -> Result<isize, E>,
        visit: &mut dyn FnMut(isize) -> Result<(), E>,
    ) -> Result<(), E> {
        if dim == self.dimensions() {
            return visit(offset);
        }
        let stride = self.strides[dim];
        let sub = self.suboffsets.get(dim).copied().unwrap_or(-1);
        for i in 0..self.shape[dim] {
            let mut item = step(offset, i, stride)?;
            if sub >= 0 {
                item = checked_add(deref(item)?, sub)?;
            }
            self.walk(dim + 1, item, deref, visit)?;
        }
        Ok(())
    }
}

fn checked_add(a: isize, b: isize) -> Result<isize, DescriptorError> {
    a.checked_add(b).ok_or(DescriptorError::LengthOverflow)
}

/// `offset + index * stride`, checked.
fn step(offset: isize, index: usize, stride: isize) -> Result<isize, DescriptorError> {
    layout::to_isize(index)?
        .checked_mul(stride)
        .and_then(|delta| offset.checked_add(delta))
        .ok_or(DescriptorError::LengthOverflow)
}

fn check_len(array: &'static str, expected: usize, actual: usize) -> Result<(), DescriptorError> {
    if expected != actual {
        return Err(DescriptorError::ArrayLengthMismatch {
            array,
            expected,
            actual,
        });
    }
    Ok(())
}
