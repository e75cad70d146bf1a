// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The runtime façade.
//!
//! [`ViewRuntime`] ties the crates together the way host code uses them:
//! it builds descriptors and buffers, constructs views with the configured
//! release policy, routes misuse through the raise handler, and hands out
//! clinic dispatch sites that raise through the same handler.
//!
//! ```text
//!            RuntimeConfig
//!                 │
//!                 ▼
//!   ViewRuntime ──► BufferRegistry ──► Arc<ManagedBuffer>
//!        │                                   ▲
//!        └──► MemoryView::over(descriptor) ──┘
//! ```

use crate::metrics::Counters;
use crate::{ObjectRef, RuntimeConfig, RuntimeError, RuntimeMetrics};
use arg_clinic::{BinaryClinic, ClinicOperation, TernaryClinic};
use buffer_descriptor::{DescriptorError, DescriptorParts, StridedBuffer};
use managed_buffer::{BackingStore, BufferRegistry, ManagedBuffer, ReleaseStats};
use memoryview::{MemoryView, ViewError};
use object_model::{LoggingRaiser, Owner, RaiseHandler, RaisedError};
use std::sync::Arc;

/// Builds and releases views under one configuration.
pub struct ViewRuntime {
    config: RuntimeConfig,
    registry: Option<BufferRegistry>,
    raiser: Arc<dyn RaiseHandler>,
    counters: Counters,
}

impl ViewRuntime {
    /// Creates a runtime, validating `config`.
    pub fn new(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        Self::with_raiser(config, Arc::new(LoggingRaiser))
    }

    pub fn with_raiser(
        config: RuntimeConfig,
        raiser: Arc<dyn RaiseHandler>,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;
        tracing::info!(
            policy = %config.release_policy,
            max_dimensions = config.max_dimensions,
            track_stats = config.track_stats,
            "view runtime created"
        );
        let registry = config.track_stats.then(BufferRegistry::new);
        Ok(Self {
            config,
            registry,
            raiser,
            counters: Counters::default(),
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn raiser(&self) -> &Arc<dyn RaiseHandler> {
        &self.raiser
    }

    fn register(&self, store: BackingStore) -> Arc<ManagedBuffer> {
        match &self.registry {
            Some(registry) => registry.register(store),
            None => ManagedBuffer::new(store),
        }
    }

    /// Allocates a zeroed buffer and a C-contiguous view over it.
    pub fn allocate_view(
        &self,
        format: &str,
        shape: Vec<usize>,
    ) -> Result<Arc<MemoryView>, RuntimeError> {
        let descriptor = StridedBuffer::c_contiguous(format, shape, self.config.default_read_only)?;
        let buffer = self.register(BackingStore::Owned(vec![0u8; descriptor.length()]));
        self.view_over(descriptor, &buffer, None)
    }

    /// Takes ownership of `bytes` and views them through `parts`.
    pub fn view_from_bytes(
        &self,
        bytes: Vec<u8>,
        parts: DescriptorParts,
    ) -> Result<Arc<MemoryView>, RuntimeError> {
        let descriptor = StridedBuffer::from_parts(parts)?;
        let buffer = self.register(BackingStore::Owned(bytes));
        self.view_over(descriptor, &buffer, None)
    }

    /// Builds a view over an existing managed buffer.
    pub fn view_over(
        &self,
        descriptor: StridedBuffer,
        buffer: &Arc<ManagedBuffer>,
        owner: Option<Owner>,
    ) -> Result<Arc<MemoryView>, RuntimeError> {
        self.check_rank(&descriptor)?;
        let view = MemoryView::over(descriptor, buffer, owner)?
            .with_release_policy(self.config.release_policy);
        self.counters.view_created();
        Ok(Arc::new(view))
    }

    /// Builds a read-only view aliasing `bytes` without a managed buffer.
    pub fn alias(
        &self,
        descriptor: StridedBuffer,
        bytes: Arc<[u8]>,
        owner: Option<Owner>,
    ) -> Result<Arc<MemoryView>, RuntimeError> {
        self.check_rank(&descriptor)?;
        let view = MemoryView::aliased(descriptor, bytes, owner)?
            .with_release_policy(self.config.release_policy);
        self.counters.view_created();
        Ok(Arc::new(view))
    }

    /// Builds a flat, read-only byte view of any buffer-like object. The
    /// object becomes the view's owner.
    pub fn view_of_object(&self, object: &Arc<ObjectRef>) -> Result<Arc<MemoryView>, RuntimeError> {
        let bytes = object.as_buffer()?.buffer_bytes()?;
        let descriptor = StridedBuffer::bytes(bytes.len(), true);
        self.alias(
            descriptor,
            Arc::from(bytes),
            Some(Owner::from_arc(Arc::clone(object))),
        )
    }

    fn check_rank(&self, descriptor: &StridedBuffer) -> Result<(), RuntimeError> {
        if descriptor.dimensions() > self.config.max_dimensions {
            return Err(DescriptorError::TooManyDimensions {
                dimensions: descriptor.dimensions(),
                max: self.config.max_dimensions,
            }
            .into());
        }
        Ok(())
    }

    /// Fails through the raise handler if `view` is released.
    pub fn check_released(&self, view: &MemoryView) -> Result<(), RaisedError> {
        view.check_released_with(&*self.raiser)
    }

    /// Materializes `view`'s bytes. A released view fails through the raise
    /// handler.
    pub fn read_bytes(&self, view: &MemoryView) -> Result<Vec<u8>, RuntimeError> {
        self.check_released(view)?;
        let bytes = view.read_as_bytes()?;
        self.counters.bytes_materialized(bytes.len());
        Ok(bytes)
    }

    /// Releases `view`. Returns `true` if this call released it.
    pub fn release(&self, view: &MemoryView) -> Result<bool, RuntimeError> {
        match view.set_released() {
            Ok(released) => {
                if released {
                    self.counters.view_released();
                }
                Ok(released)
            }
            Err(e @ ViewError::ExportsOutstanding { .. }) => {
                self.counters.release_error();
                Err(self.raiser.raise(e.kind(), e.to_string()).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// A two-argument dispatch site raising through this runtime's handler.
    pub fn binary_clinic<O: ClinicOperation>(&self, operation: O) -> BinaryClinic<O> {
        BinaryClinic::with_raiser(operation, Arc::clone(&self.raiser))
    }

    /// A three-argument dispatch site raising through this runtime's handler.
    pub fn ternary_clinic<O: ClinicOperation>(&self, operation: O) -> TernaryClinic<O> {
        TernaryClinic::with_raiser(operation, Arc::clone(&self.raiser))
    }

    /// Buffer release stats, when tracking is enabled.
    pub fn registry_stats(&self) -> Option<ReleaseStats> {
        self.registry.as_ref().map(BufferRegistry::stats)
    }

    /// Bytes held by live runtime-allocated buffers, when tracking is
    /// enabled.
    pub fn live_bytes(&self) -> Option<usize> {
        self.registry.as_ref().map(BufferRegistry::live_bytes)
    }

    pub fn metrics(&self) -> RuntimeMetrics {
        self.counters.snapshot(self.registry_stats())
    }
}

impl std::fmt::Debug for ViewRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewRuntime")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}
