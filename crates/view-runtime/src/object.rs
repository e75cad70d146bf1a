// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime objects and their capability tables.
//!
//! Instead of a class hierarchy, each [`ObjectRef`] carries an explicit
//! table of the interfaces it implements. Operations look the interface up
//! and fail with [`RuntimeError::MissingCapability`] when it is absent.

use crate::RuntimeError;
use memoryview::{BufferLike, MemoryView, Releasable, ViewError};
use std::sync::Arc;

/// Interfaces an object implements.
#[derive(Clone, Default)]
pub struct Capabilities {
    pub buffer: Option<Arc<dyn BufferLike>>,
    pub releasable: Option<Arc<dyn Releasable>>,
}

/// A named runtime object.
#[derive(Clone)]
pub struct ObjectRef {
    type_name: String,
    capabilities: Capabilities,
}

impl ObjectRef {
    pub fn new(type_name: impl Into<String>, capabilities: Capabilities) -> Self {
        Self {
            type_name: type_name.into(),
            capabilities,
        }
    }

    /// An object with no buffer-related capabilities.
    pub fn opaque(type_name: impl Into<String>) -> Self {
        Self::new(type_name, Capabilities::default())
    }

    /// A memoryview: buffer-like and releasable.
    pub fn from_view(view: Arc<MemoryView>) -> Self {
        Self::new(
            "memoryview",
            Capabilities {
                buffer: Some(Arc::clone(&view) as Arc<dyn BufferLike>),
                releasable: Some(view as Arc<dyn Releasable>),
            },
        )
    }

    /// An immutable byte string: buffer-like only.
    pub fn bytes(data: impl Into<Arc<[u8]>>) -> Self {
        Self::new(
            "bytes",
            Capabilities {
                buffer: Some(Arc::new(BytesObject(data.into()))),
                releasable: None,
            },
        )
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn is_buffer(&self) -> bool {
        self.capabilities
            .buffer
            .as_ref()
            .is_some_and(|b| b.is_buffer())
    }

    /// The buffer interface, or `MissingCapability`.
    pub fn as_buffer(&self) -> Result<&dyn BufferLike, RuntimeError> {
        self.capabilities
            .buffer
            .as_deref()
            .ok_or_else(|| self.missing("buffer"))
    }

    /// The release interface, or `MissingCapability`.
    pub fn as_releasable(&self) -> Result<&dyn Releasable, RuntimeError> {
        self.capabilities
            .releasable
            .as_deref()
            .ok_or_else(|| self.missing("release"))
    }

    fn missing(&self, capability: &'static str) -> RuntimeError {
        RuntimeError::MissingCapability {
            object: self.type_name.clone(),
            capability,
        }
    }
}

impl std::fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectRef")
            .field("type_name", &self.type_name)
            .field("buffer", &self.capabilities.buffer.is_some())
            .field("releasable", &self.capabilities.releasable.is_some())
            .finish()
    }
}

/// Backing for [`ObjectRef::bytes`].
#[derive(Debug)]
struct BytesObject(Arc<[u8]>);

impl BufferLike for BytesObject {
    fn buffer_length(&self) -> usize {
        self.0.len()
    }

    fn buffer_bytes(&self) -> Result<Vec<u8>, ViewError> {
        Ok(self.0.to_vec())
    }
}
