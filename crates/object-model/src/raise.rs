// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The raise callback capability.

use crate::{ErrorKind, RaisedError};

/// Produces runtime exceptions on behalf of collaborators.
///
/// `raise` never "returns normally" in the interpreter sense: callers always
/// wrap the result in `Err(..)` and propagate it with `?`.
pub trait RaiseHandler: Send + Sync {
    /// Builds the exception for `kind` with the given message.
    fn raise(&self, kind: ErrorKind, message: String) -> RaisedError;
}

/// Default handler: logs each raise at debug level and returns it unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingRaiser;

impl RaiseHandler for LoggingRaiser {
    fn raise(&self, kind: ErrorKind, message: String) -> RaisedError {
        tracing::debug!(%kind, %message, "raising");
        RaisedError::new(kind, message)
    }
}

impl<T: RaiseHandler + ?Sized> RaiseHandler for std::sync::Arc<T> {
    fn raise(&self, kind: ErrorKind, message: String) -> RaisedError {
        (**self).raise(kind, message)
    }
}
