// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: end-to-end view lifecycle.
//!
//! These tests exercise descriptor construction → managed buffers → views →
//! export/release → teardown, proving that the crates compose and that the
//! release guarantees hold across threads.

use arg_clinic::{CastSpec, ClinicOperation, Conversion, Dispatched, Prim, PrimitiveKind};
use buffer_descriptor::{DescriptorParts, StridedBuffer};
use managed_buffer::{BufferRegistry, ManagedBuffer};
use memoryview::{BufferLike, MemoryView, ReleasePolicy, ViewError};
use object_model::{ErrorKind, RaiseHandler, RaisedError, Value};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use view_runtime::{ObjectRef, RuntimeConfig, RuntimeError, ViewRuntime};

// ── Helpers ────────────────────────────────────────────────────

fn runtime() -> ViewRuntime {
    ViewRuntime::new(RuntimeConfig::default()).unwrap()
}

fn int32_bytes(values: impl IntoIterator<Item = i32>) -> Vec<u8> {
    values.into_iter().flat_map(i32::to_ne_bytes).collect()
}

/// Foreign memory whose teardown bumps a counter.
struct Foreign {
    memory: Box<[u8]>,
    teardowns: Arc<AtomicUsize>,
}

impl Foreign {
    fn new(len: usize) -> Self {
        Self {
            memory: vec![0u8; len].into_boxed_slice(),
            teardowns: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn register(&mut self, registry: &BufferRegistry) -> Arc<ManagedBuffer> {
        let ptr = NonNull::new(self.memory.as_mut_ptr()).unwrap();
        let counter = Arc::clone(&self.teardowns);
        // SAFETY: `self.memory` outlives every buffer built in these tests.
        unsafe {
            registry.adopt_foreign(ptr, self.memory.len(), false, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        }
    }

    fn teardowns(&self) -> usize {
        self.teardowns.load(Ordering::SeqCst)
    }
}

/// Raise handler that counts what it raises.
#[derive(Default)]
struct CountingRaiser {
    raised: AtomicUsize,
}

impl RaiseHandler for CountingRaiser {
    fn raise(&self, kind: ErrorKind, message: String) -> RaisedError {
        self.raised.fetch_add(1, Ordering::SeqCst);
        RaisedError::new(kind, message)
    }
}

// ── End-to-end scenarios ───────────────────────────────────────

#[test]
fn test_int32_matrix_lifecycle() {
    let rt = runtime();
    let view = rt
        .view_from_bytes(
            int32_bytes(0..6),
            DescriptorParts {
                length: 24,
                item_size: 4,
                format_string: "i".into(),
                shape: vec![2, 3],
                strides: None,
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(view.descriptor().strides(), &[12, 4]);
    assert_eq!(view.buffer_length(), 24);
    assert!(view.is_c_contiguous());

    let bytes = rt.read_bytes(&view).unwrap();
    assert_eq!(bytes, int32_bytes(0..6));

    assert!(rt.release(&view).unwrap());
    assert_eq!(view.read_as_bytes(), Err(ViewError::Released));
    assert_eq!(
        view.read_as_bytes().unwrap_err().to_string(),
        "operation forbidden on released buffer"
    );
    assert_eq!(view.buffer_bytes(), Err(ViewError::Released));
}

#[test]
fn test_two_views_share_one_buffer() {
    let registry = BufferRegistry::new();
    let mut foreign = Foreign::new(16);
    let buffer = foreign.register(&registry);

    let first = MemoryView::over(StridedBuffer::bytes(16, false), &buffer, None).unwrap();
    let second = MemoryView::over(
        StridedBuffer::c_contiguous("i", vec![2], true).unwrap().with_byte_offset(8),
        &buffer,
        None,
    )
    .unwrap();
    assert_eq!(buffer.attached_references(), 2);

    first.set_released().unwrap();
    assert!(!buffer.is_released());
    assert_eq!(foreign.teardowns(), 0);
    assert_eq!(second.read_as_bytes().unwrap().len(), 8);

    second.set_released().unwrap();
    assert!(buffer.is_released());
    assert_eq!(foreign.teardowns(), 1);

    second.set_released().unwrap();
    drop(buffer);
    assert_eq!(foreign.teardowns(), 1);
    assert_eq!(registry.stats().deferred_releases, 1);
}

#[test]
fn test_dropped_view_releases_buffer() {
    let rt = runtime();
    let view = rt.allocate_view("q", vec![4]).unwrap();
    let buffer = view.managed_buffer().unwrap();
    drop(view);
    assert!(buffer.is_released());
    assert_eq!(rt.registry_stats().unwrap().deferred_releases, 1);
    assert_eq!(rt.live_bytes(), Some(0));
}

#[test]
fn test_export_outlives_view_release() {
    let rt = runtime();
    let view = rt.allocate_view("B", vec![8]).unwrap();
    view.write_item(&[3], &[42]).unwrap();
    let buffer = view.managed_buffer().unwrap();

    let export = view.acquire_export().unwrap();
    assert!(export.is_pinned());
    rt.release(&view).unwrap();

    // The export still reaches the bytes through the pinned buffer.
    assert!(!buffer.is_released());
    assert_eq!(buffer.with_bytes(|b| b[3]).unwrap(), 42);

    drop(export);
    assert!(buffer.is_released());
}

#[test]
fn test_strict_policy_from_toml() {
    let config = RuntimeConfig::from_toml("release_policy = \"reject-while-exported\"").unwrap();
    let rt = ViewRuntime::new(config).unwrap();
    let view = rt.allocate_view("B", vec![2]).unwrap();
    assert_eq!(view.release_policy(), ReleasePolicy::RejectWhileExported);

    view.export();
    let err = rt.release(&view).unwrap_err();
    assert!(matches!(err, RuntimeError::Raised(_)));
    assert!(!view.is_released());

    view.release_export();
    assert!(rt.release(&view).unwrap());
}

#[test]
fn test_released_access_goes_through_raiser() {
    let raiser = Arc::new(CountingRaiser::default());
    let rt = ViewRuntime::with_raiser(RuntimeConfig::default(), raiser.clone()).unwrap();
    let view = rt.allocate_view("B", vec![1]).unwrap();
    rt.release(&view).unwrap();

    let err = rt.read_bytes(&view).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueError);
    assert!(rt.check_released(&view).is_err());
    assert_eq!(raiser.raised.load(Ordering::SeqCst), 2);
}

#[test]
fn test_strided_and_transposed_views() {
    let rt = runtime();
    // Column view of a 3x2 int32 matrix: every other element.
    let column = rt
        .view_from_bytes(
            int32_bytes([1, 2, 3, 4, 5, 6]),
            DescriptorParts {
                length: 12,
                item_size: 4,
                format_string: "i".into(),
                shape: vec![3],
                strides: Some(vec![8]),
                byte_offset: 4,
                ..Default::default()
            },
        )
        .unwrap();
    assert!(!column.is_c_contiguous());
    assert_eq!(rt.read_bytes(&column).unwrap(), int32_bytes([2, 4, 6]));

    let transposed = rt
        .view_from_bytes(
            int32_bytes([1, 2, 3, 4, 5, 6]),
            DescriptorParts {
                length: 24,
                item_size: 4,
                format_string: "i".into(),
                shape: vec![3, 2],
                strides: Some(vec![4, 12]),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(transposed.is_fortran_contiguous());
    assert_eq!(rt.read_bytes(&transposed).unwrap(), int32_bytes([1, 4, 2, 5, 3, 6]));
    assert_eq!(transposed.read_item(&[2, 1]).unwrap(), 6i32.to_ne_bytes().to_vec());
}

#[test]
fn test_equal_content_hashes_equal() {
    let rt = runtime();
    let contiguous = rt
        .alias(
            StridedBuffer::c_contiguous("i", vec![3], true).unwrap(),
            Arc::from(int32_bytes([2, 4, 6])),
            None,
        )
        .unwrap();
    let strided = rt
        .view_from_bytes(
            int32_bytes([1, 2, 3, 4, 5, 6]),
            DescriptorParts {
                length: 12,
                read_only: true,
                item_size: 4,
                format_string: "i".into(),
                shape: vec![3],
                strides: Some(vec![8]),
                byte_offset: 4,
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(contiguous.content_hash().unwrap(), strided.content_hash().unwrap());
}

#[test]
fn test_object_capabilities() {
    let rt = runtime();
    let view = rt.allocate_view("B", vec![3]).unwrap();
    let obj = ObjectRef::from_view(Arc::clone(&view));
    assert!(obj.is_buffer());
    assert_eq!(obj.as_buffer().unwrap().buffer_length(), 3);
    assert!(obj.as_releasable().unwrap().release().unwrap());
    assert!(view.is_released());

    let bytes = Arc::new(ObjectRef::bytes(vec![1u8, 2]));
    let copy = rt.view_of_object(&bytes).unwrap();
    assert_eq!(copy.read_as_bytes().unwrap(), vec![1, 2]);
}

// ── Concurrency ────────────────────────────────────────────────

#[test]
fn test_concurrent_release_tears_down_once() {
    let registry = BufferRegistry::new();
    let mut foreign = Foreign::new(64);
    let buffer = foreign.register(&registry);

    let threads = 16;
    let barrier = Barrier::new(threads);
    let winners = AtomicUsize::new(0);
    std::thread::scope(|s| {
        for _ in 0..threads {
            s.spawn(|| {
                barrier.wait();
                if buffer.release() {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(winners.load(Ordering::SeqCst), 1);
    assert_eq!(foreign.teardowns(), 1);
    let stats = registry.stats();
    assert_eq!(stats.explicit_releases, 1);
    assert_eq!(stats.redundant_releases, threads as u64 - 1);
}

#[test]
fn test_concurrent_exports_balance() {
    let rt = runtime();
    let view = rt.allocate_view("B", vec![4]).unwrap();
    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..1000 {
                    view.export();
                    view.release_export();
                }
            });
        }
    });
    assert_eq!(view.exports(), 0);
}

#[test]
fn test_concurrent_set_released_is_idempotent() {
    let registry = BufferRegistry::new();
    let mut foreign = Foreign::new(8);
    let buffer = foreign.register(&registry);
    let view = MemoryView::over(StridedBuffer::bytes(8, false), &buffer, None).unwrap();

    let threads = 8;
    let barrier = Barrier::new(threads);
    let released = AtomicUsize::new(0);
    std::thread::scope(|s| {
        for _ in 0..threads {
            s.spawn(|| {
                barrier.wait();
                if view.set_released() == Ok(true) {
                    released.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(released.load(Ordering::SeqCst), 1);
    assert_eq!(foreign.teardowns(), 1);
}

#[test]
fn test_views_dropped_across_threads() {
    let registry = BufferRegistry::new();
    let mut foreign = Foreign::new(32);
    let buffer = foreign.register(&registry);
    let views: Vec<MemoryView> = (0..8)
        .map(|_| MemoryView::over(StridedBuffer::bytes(32, true), &buffer, None).unwrap())
        .collect();

    std::thread::scope(|s| {
        for view in views {
            s.spawn(move || {
                assert_eq!(view.read_as_bytes().unwrap().len(), 32);
                drop(view);
            });
        }
    });

    assert!(buffer.is_released());
    assert_eq!(foreign.teardowns(), 1);
}

// ── Clinic dispatch through the runtime ────────────────────────

/// `a <= b`, specialized for (int, int).
#[derive(Default)]
struct LessEqual {
    generic_calls: AtomicUsize,
}

impl ClinicOperation for LessEqual {
    fn name(&self) -> &str {
        "less_equal"
    }

    fn cast_spec(&self, _position: usize) -> Option<CastSpec> {
        Some(CastSpec::new(Conversion::Double))
    }

    fn accepts(&self, _position: usize, kind: PrimitiveKind) -> bool {
        kind == PrimitiveKind::Int
    }

    fn call(&self, args: &[Value]) -> Result<Value, RaisedError> {
        self.generic_calls.fetch_add(1, Ordering::SeqCst);
        match (&args[0], &args[1]) {
            (Value::Float(a), Value::Float(b)) => Ok(Value::Bool(a <= b)),
            _ => Err(RaisedError::new(ErrorKind::TypeError, "expected floats")),
        }
    }

    fn call_primitive(&self, args: &[Prim]) -> Result<Prim, RaisedError> {
        match (args[0], args[1]) {
            (Prim::Int(a), Prim::Int(b)) => Ok(Prim::Bool(a <= b)),
            _ => Err(RaisedError::new(ErrorKind::SystemError, "bad specialization")),
        }
    }
}

#[test]
fn test_clinic_fast_path_and_fallback() {
    let raiser = Arc::new(CountingRaiser::default());
    let rt = ViewRuntime::with_raiser(RuntimeConfig::default(), raiser.clone()).unwrap();
    let site = rt.binary_clinic(LessEqual::default());

    let r: bool = site.execute2(1i32, 2i32).unwrap();
    assert!(r);
    assert_eq!(site.operation().generic_calls.load(Ordering::SeqCst), 0);

    // Long arguments are not accepted uncoerced; both get cast to double.
    let r: bool = site.execute2(5i64, 2i64).unwrap();
    assert!(!r);
    assert_eq!(site.operation().generic_calls.load(Ordering::SeqCst), 1);
    assert!(site.has_cast_node(0) && site.has_cast_node(1));

    let d = site.dispatch2::<i64, i64, i32>(1, 1).unwrap();
    assert_eq!(d, Dispatched::Generic(Value::Bool(true)));

    let err = site.call([Value::Str("x".into()), Value::Float(1.0)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeError);
    assert_eq!(raiser.raised.load(Ordering::SeqCst), 1);
}
