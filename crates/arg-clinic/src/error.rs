// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for argument coercion and dispatch.

use object_model::{ErrorKind, RaisedError, Value};

/// Errors that can occur during clinic dispatch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClinicError {
    /// A coercion or the operation itself raised.
    #[error(transparent)]
    Raised(#[from] RaisedError),

    /// The generic path returned a value that does not narrow to the
    /// requested primitive type.
    #[error("unexpected result of type {}: {0}", .0.type_name())]
    UnexpectedResult(Value),

    /// A dynamically sized call supplied the wrong number of arguments.
    #[error("expected {expected} arguments, got {actual}")]
    Arity { expected: usize, actual: usize },
}

impl ClinicError {
    /// The runtime exception kind this error surfaces as.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClinicError::Raised(e) => e.kind(),
            ClinicError::UnexpectedResult(_) | ClinicError::Arity { .. } => ErrorKind::TypeError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ClinicError::UnexpectedResult(Value::Str("x".into()));
        assert_eq!(err.to_string(), "unexpected result of type str: \"x\"");
        assert_eq!(err.kind(), ErrorKind::TypeError);
    }

    #[test]
    fn test_raised_kind_passes_through() {
        let err = ClinicError::from(RaisedError::new(ErrorKind::OverflowError, "too big"));
        assert_eq!(err.kind(), ErrorKind::OverflowError);
        assert_eq!(err.to_string(), "OverflowError: too big");
    }
}
