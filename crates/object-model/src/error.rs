// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime exception taxonomy.

use std::fmt;

/// The class of a runtime-level exception.
///
/// Crate-local errors (`ViewError`, `ClinicError`, ...) map onto one of
/// these when they surface to the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Misuse of a value that has the right type, e.g. a released buffer.
    ValueError,
    /// A value of the wrong type was supplied.
    TypeError,
    /// A numeric value does not fit the target domain.
    OverflowError,
    /// The buffer protocol was violated (e.g. writing a read-only view).
    BufferError,
    /// An internal invariant was broken.
    SystemError,
}

impl ErrorKind {
    /// Returns the runtime class name.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ValueError => "ValueError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::OverflowError => "OverflowError",
            ErrorKind::BufferError => "BufferError",
            ErrorKind::SystemError => "SystemError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An exception produced by a [`RaiseHandler`](crate::RaiseHandler).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RaisedError {
    kind: ErrorKind,
    message: String,
}

impl RaisedError {
    /// Creates a new raised error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the exception class.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the exception message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
