// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # memoryview
//!
//! Multi-dimensional strided views over managed or aliased memory.
//!
//! # Key Components
//!
//! - [`MemoryView`] - a [`StridedBuffer`](buffer_descriptor::StridedBuffer)
//!   descriptor plus a [`ViewPointer`], an export counter, atomically
//!   visible [`ViewFlags`] and a memoized hash.
//! - [`ExportGuard`] - RAII handle for a native export: counts the export and
//!   pins the managed buffer.
//! - [`ReleasePolicy`] - whether releasing a view with live exports proceeds
//!   or is refused.
//! - [`BufferLike`] / [`Releasable`] - capabilities the host object model
//!   dispatches through.
//!
//! # Release
//!
//! ```text
//!  view A ──┐
//!           ├──► ManagedBuffer ──► backing store
//!  view B ──┘
//!
//!  A.set_released()  → A fails fast, buffer alive (B still attached)
//!  B.set_released()  → buffer torn down exactly once
//! ```
//!
//! A view that is dropped without `set_released()` still detaches its
//! reference, so the buffer is reclaimed either way.

mod access;
mod capability;
mod error;
mod export;
mod flags;
mod view;

pub use capability::{BufferLike, Releasable};
pub use error::{ViewError, RELEASED_MESSAGE};
pub use export::ExportGuard;
pub use flags::{ReleasePolicy, ViewFlags};
pub use view::{MemoryView, ViewPointer, HASH_NOT_COMPUTED};
