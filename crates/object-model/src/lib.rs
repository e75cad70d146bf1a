// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # object-model
//!
//! The thin slice of the host object model that the buffer and clinic crates
//! consume:
//!
//! - [`Value`] - a boxed runtime value, including the [`NoValue`] sentinel
//!   used for "argument not supplied".
//! - [`Owner`] - an opaque, shareable handle to whatever object owns a
//!   buffer. Views keep it only for lifetime bookkeeping.
//! - [`ErrorKind`] / [`RaisedError`] - the runtime-level exception taxonomy.
//! - [`RaiseHandler`] - the raise callback. Collaborators never construct
//!   runtime exceptions themselves; they ask the handler, which may log,
//!   count or decorate the error before it is returned.
//!
//! # Example
//! ```
//! use object_model::{ErrorKind, LoggingRaiser, RaiseHandler, Value};
//!
//! let raiser = LoggingRaiser;
//! let err = raiser.raise(ErrorKind::TypeError, "expected int".into());
//! assert_eq!(err.kind(), ErrorKind::TypeError);
//! assert!(Value::NoValue.is_no_value());
//! ```

mod error;
mod owner;
mod raise;
mod value;

pub use error::{ErrorKind, RaisedError};
pub use owner::Owner;
pub use raise::{LoggingRaiser, RaiseHandler};
pub use value::{NoValue, Value};
