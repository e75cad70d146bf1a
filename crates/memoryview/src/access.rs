// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Reading and writing items through a descriptor.
//!
//! Everything here works on a plain byte slice: the backing region, with the
//! descriptor's offsets measured from its start. Stored pointers used by
//! indirect dimensions are native-endian `isize` offsets into the same
//! region.

use crate::ViewError;
use buffer_descriptor::{DescriptorError, StridedBuffer};

const POINTER_SIZE: usize = std::mem::size_of::<isize>();

/// Bounds-checks `[offset, offset + len)` against `region`.
fn span(region: &[u8], offset: isize, len: usize) -> Result<std::ops::Range<usize>, ViewError> {
    let out_of_bounds = || ViewError::OutOfBounds {
        offset,
        len,
        region_len: region.len(),
    };
    let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
    let end = start.checked_add(len).ok_or_else(out_of_bounds)?;
    if end > region.len() {
        return Err(out_of_bounds());
    }
    Ok(start..end)
}

/// Follows the stored pointer at `offset`.
pub(crate) fn deref(region: &[u8], offset: isize) -> Result<isize, ViewError> {
    let range = span(region, offset, POINTER_SIZE)?;
    let mut raw = [0u8; POINTER_SIZE];
    raw.copy_from_slice(&region[range]);
    Ok(isize::from_ne_bytes(raw))
}

/// Materializes the view's items in C order.
pub(crate) fn gather(descriptor: &StridedBuffer, region: &[u8]) -> Result<Vec<u8>, ViewError> {
    let item_size = descriptor.item_size();

    if descriptor.is_c_contiguous() {
        let start =
            isize::try_from(descriptor.byte_offset()).map_err(|_| DescriptorError::LengthOverflow)?;
        let range = span(region, start, descriptor.length())?;
        return Ok(region[range].to_vec());
    }

    let mut out = Vec::with_capacity(descriptor.length());
    descriptor.for_each_item_offset(
        |at| deref(region, at),
        |at| {
            let range = span(region, at, item_size)?;
            out.extend_from_slice(&region[range]);
            Ok(())
        },
    )?;
    Ok(out)
}

/// Copies out the item at `index`.
pub(crate) fn read_item(
    descriptor: &StridedBuffer,
    region: &[u8],
    index: &[usize],
) -> Result<Vec<u8>, ViewError> {
    let at = descriptor.item_offset_with(index, |p| deref(region, p))?;
    let range = span(region, at, descriptor.item_size())?;
    Ok(region[range].to_vec())
}

/// Overwrites the item at `index` with `bytes`.
pub(crate) fn write_item(
    descriptor: &StridedBuffer,
    region: &mut [u8],
    index: &[usize],
    bytes: &[u8],
) -> Result<(), ViewError> {
    if bytes.len() != descriptor.item_size() {
        return Err(ViewError::ItemLength {
            expected: descriptor.item_size(),
            actual: bytes.len(),
        });
    }
    let at = descriptor.item_offset_with(index, |p| deref(region, p))?;
    let range = span(region, at, bytes.len())?;
    region[range].copy_from_slice(bytes);
    Ok(())
}

/// Checks that a non-indirect layout stays inside a region of `region_len`
/// bytes.
pub(crate) fn check_extent(descriptor: &StridedBuffer, region_len: usize) -> Result<(), ViewError> {
    let Some((lo, hi)) = descriptor.byte_extent()? else {
        return Ok(());
    };
    if lo < 0 || hi as usize > region_len {
        return Err(ViewError::OutOfBounds {
            offset: lo,
            len: (hi - lo) as usize,
            region_len,
        });
    }
    Ok(())
}
