// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the view runtime.

use object_model::ErrorKind;

/// Errors surfaced by [`ViewRuntime`](crate::ViewRuntime).
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// A descriptor could not be built or exceeds the configured limits.
    #[error("descriptor error: {0}")]
    Descriptor(#[from] buffer_descriptor::DescriptorError),

    /// A managed buffer operation failed.
    #[error("buffer error: {0}")]
    Buffer(#[from] managed_buffer::BufferError),

    /// A view operation failed.
    #[error("view error: {0}")]
    View(#[from] memoryview::ViewError),

    /// Argument coercion or dispatch failed.
    #[error("dispatch error: {0}")]
    Clinic(#[from] arg_clinic::ClinicError),

    /// An exception produced by the runtime's raise handler.
    #[error("{0}")]
    Raised(#[from] object_model::RaisedError),

    /// An object does not provide the capability an operation needs.
    #[error("'{object}' does not support the {capability} interface")]
    MissingCapability {
        object: String,
        capability: &'static str,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl RuntimeError {
    /// The runtime exception kind this error surfaces as.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::Descriptor(_) | RuntimeError::ConfigError(_) => ErrorKind::ValueError,
            RuntimeError::Buffer(e) => memoryview::ViewError::Buffer(e.clone()).kind(),
            RuntimeError::View(e) => e.kind(),
            RuntimeError::Clinic(e) => e.kind(),
            RuntimeError::Raised(e) => e.kind(),
            RuntimeError::MissingCapability { .. } => ErrorKind::TypeError,
        }
    }
}
