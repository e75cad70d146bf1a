// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! View flags and the release policy.

use buffer_descriptor::StridedBuffer;
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// State and layout flags of a [`MemoryView`](crate::MemoryView).
    ///
    /// Only `RELEASED` changes after construction.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ViewFlags: u8 {
        /// The view has been released; data access fails.
        const RELEASED = 1 << 0;
        /// Items are laid out in C (row-major) order with no gaps.
        const C_CONTIGUOUS = 1 << 1;
        /// Items are laid out in Fortran (column-major) order with no gaps.
        const FORTRAN_CONTIGUOUS = 1 << 2;
        /// Zero-dimensional view over a single item.
        const SCALAR = 1 << 3;
        /// At least one dimension goes through pointer indirection.
        const PIL = 1 << 4;
    }
}

impl ViewFlags {
    /// Derives the layout flags from a descriptor.
    pub fn infer(descriptor: &StridedBuffer) -> Self {
        let mut flags = ViewFlags::empty();
        if descriptor.is_scalar() {
            flags |= ViewFlags::SCALAR;
        }
        if descriptor.has_indirection() {
            flags |= ViewFlags::PIL;
        }
        if descriptor.is_c_contiguous() {
            flags |= ViewFlags::C_CONTIGUOUS;
        }
        if descriptor.is_fortran_contiguous() {
            flags |= ViewFlags::FORTRAN_CONTIGUOUS;
        }
        flags
    }
}

/// What `set_released()` does when native exports are still outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleasePolicy {
    /// Release anyway and detach the buffer reference. Live exports keep the
    /// managed buffer pinned, so their bytes stay valid.
    #[default]
    BestEffort,
    /// Refuse with [`ViewError::ExportsOutstanding`](crate::ViewError).
    RejectWhileExported,
}

impl std::fmt::Display for ReleasePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleasePolicy::BestEffort => write!(f, "best-effort"),
            ReleasePolicy::RejectWhileExported => write!(f, "reject-while-exported"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_matrix() {
        let d = StridedBuffer::c_contiguous("i", vec![2, 3], false).unwrap();
        let flags = ViewFlags::infer(&d);
        assert!(flags.contains(ViewFlags::C_CONTIGUOUS));
        assert!(!flags.contains(ViewFlags::FORTRAN_CONTIGUOUS));
        assert!(!flags.contains(ViewFlags::SCALAR));
        assert!(!flags.contains(ViewFlags::RELEASED));
    }

    #[test]
    fn test_infer_scalar() {
        let d = StridedBuffer::scalar("d", true).unwrap();
        let flags = ViewFlags::infer(&d);
        assert!(flags.contains(ViewFlags::SCALAR | ViewFlags::C_CONTIGUOUS | ViewFlags::FORTRAN_CONTIGUOUS));
    }

    #[test]
    fn test_policy_display() {
        assert_eq!(ReleasePolicy::default(), ReleasePolicy::BestEffort);
        assert_eq!(ReleasePolicy::RejectWhileExported.to_string(), "reject-while-exported");
    }
}
