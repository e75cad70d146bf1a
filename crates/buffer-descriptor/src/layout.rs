// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Stride derivation and contiguity checks.
//!
//! Strides are signed byte distances: a negative stride walks the
//! dimension backwards from the item at index 0.

use crate::DescriptorError;

/// Maximum number of dimensions a descriptor may have.
pub const MAX_DIMENSIONS: usize = 64;

/// Converts a size to a signed byte distance.
pub(crate) fn to_isize(n: usize) -> Result<isize, DescriptorError> {
    isize::try_from(n).map_err(|_| DescriptorError::LengthOverflow)
}

/// Computes row-major (C-order) byte strides for `shape`.
///
/// `strides[d - 1] = item_size` and `strides[i] = strides[i + 1] * shape[i + 1]`
/// for `i` decreasing. A rank-0 shape yields no strides. Fails with
/// [`DescriptorError::LengthOverflow`] when a stride does not fit in `isize`.
///
/// # Examples
/// ```
/// use buffer_descriptor::init_strides_from_shape;
/// assert_eq!(init_strides_from_shape(4, &[2, 3]).unwrap(), vec![12, 4]);
/// ```
pub fn init_strides_from_shape(
    item_size: usize,
    shape: &[usize],
) -> Result<Vec<isize>, DescriptorError> {
    let rank = shape.len();
    if rank == 0 {
        return Ok(vec![]);
    }
    let mut strides = vec![0isize; rank];
    strides[rank - 1] = to_isize(item_size)?;
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1]
            .checked_mul(to_isize(shape[i + 1])?)
            .ok_or(DescriptorError::LengthOverflow)?;
    }
    Ok(strides)
}

/// Computes column-major (Fortran-order) byte strides for `shape`.
pub fn init_fortran_strides_from_shape(
    item_size: usize,
    shape: &[usize],
) -> Result<Vec<isize>, DescriptorError> {
    let mut strides = Vec::with_capacity(shape.len());
    let mut step = to_isize(item_size)?;
    for (i, &dim) in shape.iter().enumerate() {
        strides.push(step);
        if i + 1 < shape.len() {
            step = step
                .checked_mul(to_isize(dim)?)
                .ok_or(DescriptorError::LengthOverflow)?;
        }
    }
    Ok(strides)
}

/// `expected * dim`, or `None` once the product leaves `isize`.
fn next_expected(expected: Option<isize>, dim: usize) -> Option<isize> {
    expected.and_then(|e| e.checked_mul(isize::try_from(dim).ok()?))
}

/// Returns `true` if any suboffset requests pointer indirection.
pub fn has_indirection(suboffsets: &[isize]) -> bool {
    suboffsets.iter().any(|&s| s >= 0)
}

/// Returns `true` if the layout is C-contiguous.
///
/// Dimensions of length 1 may carry any stride. A layout with a zero-length
/// dimension holds no items and is trivially contiguous.
pub fn is_c_contiguous(item_size: usize, shape: &[usize], strides: &[isize], suboffsets: &[isize]) -> bool {
    if has_indirection(suboffsets) {
        return false;
    }
    if shape.contains(&0) {
        return true;
    }
    let mut expected = isize::try_from(item_size).ok();
    for i in (0..shape.len()).rev() {
        if shape[i] > 1 && Some(strides[i]) != expected {
            return false;
        }
        expected = next_expected(expected, shape[i]);
    }
    true
}

/// Returns `true` if the layout is Fortran-contiguous.
pub fn is_fortran_contiguous(
    item_size: usize,
    shape: &[usize],
    strides: &[isize],
    suboffsets: &[isize],
) -> bool {
    if has_indirection(suboffsets) {
        return false;
    }
    if shape.contains(&0) {
        return true;
    }
    let mut expected = isize::try_from(item_size).ok();
    for i in 0..shape.len() {
        if shape[i] > 1 && Some(strides[i]) != expected {
            return false;
        }
        expected = next_expected(expected, shape[i]);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scalar_strides() {
        assert!(init_strides_from_shape(8, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_vector_strides() {
        assert_eq!(init_strides_from_shape(4, &[5]).unwrap(), vec![4]);
    }

    #[test]
    fn test_3d_strides() {
        assert_eq!(init_strides_from_shape(1, &[2, 3, 4]).unwrap(), vec![12, 4, 1]);
        assert_eq!(init_strides_from_shape(2, &[2, 3, 4]).unwrap(), vec![24, 8, 2]);
    }

    #[test]
    fn test_fortran_strides() {
        assert_eq!(init_fortran_strides_from_shape(4, &[2, 3]).unwrap(), vec![4, 8]);
    }

    #[test]
    fn test_oversized_shape_overflows() {
        assert_eq!(
            init_strides_from_shape(4, &[2, 1 << 62, 4]),
            Err(DescriptorError::LengthOverflow)
        );
        assert_eq!(
            init_strides_from_shape(1, &[1, usize::MAX]),
            Err(DescriptorError::LengthOverflow)
        );
        assert_eq!(
            init_fortran_strides_from_shape(4, &[1 << 62, 4]),
            Err(DescriptorError::LengthOverflow)
        );
    }

    #[test]
    fn test_contiguity_with_huge_dimensions() {
        // usize::MAX does not fit in isize, so no stride can follow it.
        assert!(!is_c_contiguous(1, &[2, usize::MAX], &[-1, 1], &[]));
        assert!(!is_fortran_contiguous(1, &[usize::MAX, 2], &[1, -1], &[]));
    }

    #[test]
    fn test_c_contiguity() {
        assert!(is_c_contiguous(4, &[2, 3], &[12, 4], &[]));
        assert!(!is_c_contiguous(4, &[2, 3], &[4, 8], &[]));
        // Length-1 dimensions ignore their stride.
        assert!(is_c_contiguous(4, &[1, 3], &[999, 4], &[]));
        // Empty layouts are contiguous.
        assert!(is_c_contiguous(4, &[0, 3], &[-7, 3], &[]));
        // Scalars are contiguous.
        assert!(is_c_contiguous(8, &[], &[], &[]));
    }

    #[test]
    fn test_fortran_contiguity() {
        assert!(is_fortran_contiguous(4, &[2, 3], &[4, 8], &[]));
        assert!(!is_fortran_contiguous(4, &[2, 3], &[12, 4], &[]));
        // 1-D layouts are both.
        assert!(is_fortran_contiguous(2, &[7], &[2], &[]));
        assert!(is_c_contiguous(2, &[7], &[2], &[]));
    }

    #[test]
    fn test_indirection_breaks_contiguity() {
        assert!(!is_c_contiguous(1, &[2, 3], &[3, 1], &[0, -1]));
        assert!(!is_fortran_contiguous(1, &[2, 3], &[1, 2], &[-1, 0]));
        assert!(is_c_contiguous(1, &[2, 3], &[3, 1], &[-1, -1]));
    }

    proptest! {
        #[test]
        fn prop_strides_are_suffix_products(
            item_size in 1usize..16,
            shape in proptest::collection::vec(1usize..6, 0..=8),
        ) {
            let strides = init_strides_from_shape(item_size, &shape).unwrap();
            prop_assert_eq!(strides.len(), shape.len());
            for i in 0..shape.len() {
                let tail: usize = shape[i + 1..].iter().product();
                prop_assert_eq!(strides[i], (item_size * tail) as isize);
            }
            prop_assert!(is_c_contiguous(item_size, &shape, &strides, &[]));
        }

        #[test]
        fn prop_max_rank_unit_shape(item_size in 1usize..16) {
            let shape = vec![1usize; MAX_DIMENSIONS];
            let strides = init_strides_from_shape(item_size, &shape).unwrap();
            prop_assert!(strides.iter().all(|&s| s == item_size as isize));
        }
    }
}
