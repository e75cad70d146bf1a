// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # managed-buffer
//!
//! Shared, reference-counted regions of memory with exactly-once release.
//!
//! # Key Components
//!
//! - [`ManagedBuffer`] - owns a [`BackingStore`] and tears it down exactly
//!   once, either on an explicit [`release`](ManagedBuffer::release) or when
//!   nothing needs it anymore.
//! - [`BufferReference`] - a view's back-reference. Detaching the last one
//!   triggers deferred release.
//! - [`ExportPin`] - held while native code has the bytes; defers the
//!   automatic release until unpinned.
//! - [`BufferRegistry`] - a factory that tracks live bytes and
//!   [`ReleaseStats`].
//!
//! # Ownership Model
//!
//! ```text
//!   MemoryView ──► BufferReference ──┐
//!   MemoryView ──► BufferReference ──┼──► Arc<ManagedBuffer> ──► BackingStore
//!   native export ──► ExportPin ─────┘
//! ```
//!
//! The buffer is released once no reference is attached and no pin is held,
//! or earlier if someone calls `release()` explicitly.
//!
//! # Example
//! ```
//! use managed_buffer::BufferRegistry;
//!
//! let registry = BufferRegistry::new();
//! let buffer = registry.adopt(vec![1, 2, 3, 4]);
//!
//! let first = buffer.attach().unwrap();
//! let second = buffer.attach().unwrap();
//!
//! drop(first);
//! assert!(!buffer.is_released());
//! drop(second);
//! assert!(buffer.is_released());
//! ```

mod backing;
mod buffer;
mod error;
mod pin;
mod reference;
pub mod registry;
mod stats;

pub use backing::{BackingStore, ExportedRange, ForeignRegion};
pub use buffer::{ManagedBuffer, ReleaseCause};
pub use error::BufferError;
pub use pin::ExportPin;
pub use reference::BufferReference;
pub use registry::BufferRegistry;
pub use stats::ReleaseStats;
