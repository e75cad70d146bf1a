// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Opaque owner handles.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A shared, type-erased handle to the object that owns a buffer.
///
/// The buffer subsystem never looks inside an owner; it only holds the
/// handle so the owner outlives the view until the view is released.
#[derive(Clone)]
pub struct Owner(Arc<dyn Any + Send + Sync>);

impl Owner {
    /// Wraps an arbitrary value as an owner.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Wraps an already shared value without re-allocating.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self(value)
    }

    /// Returns the owner as `T` if it has that type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Returns `true` if both handles point at the same object.
    pub fn ptr_eq(&self, other: &Owner) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live handles to the owner object.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl fmt::Debug for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Owner")
            .field("strong_count", &self.strong_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast() {
        let owner = Owner::new(String::from("bytes-object"));
        assert_eq!(owner.downcast_ref::<String>().map(String::as_str), Some("bytes-object"));
        assert!(owner.downcast_ref::<u32>().is_none());
    }

    #[test]
    fn test_identity() {
        let a = Owner::new(1u8);
        let b = a.clone();
        let c = Owner::new(1u8);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        assert_eq!(a.strong_count(), 2);
    }
}
