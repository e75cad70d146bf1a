// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for view reads, export bookkeeping and clinic dispatch.

use arg_clinic::{CastSpec, ClinicOperation, Conversion, Prim, PrimitiveKind};
use buffer_descriptor::DescriptorParts;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use object_model::{ErrorKind, RaisedError, Value};
use view_runtime::{RuntimeConfig, ViewRuntime};

fn bench_read_as_bytes(c: &mut Criterion) {
    let rt = ViewRuntime::new(RuntimeConfig::default()).unwrap();
    let contiguous = rt.allocate_view("d", vec![64, 64]).unwrap();
    let transposed = rt
        .view_from_bytes(
            vec![0u8; 64 * 64 * 8],
            DescriptorParts {
                length: 64 * 64 * 8,
                item_size: 8,
                format_string: "d".into(),
                shape: vec![64, 64],
                strides: Some(vec![8, 64 * 8]),
                ..Default::default()
            },
        )
        .unwrap();

    c.bench_function("read_as_bytes_contiguous_64x64", |b| {
        b.iter(|| black_box(contiguous.read_as_bytes().unwrap()))
    });
    c.bench_function("read_as_bytes_transposed_64x64", |b| {
        b.iter(|| black_box(transposed.read_as_bytes().unwrap()))
    });
}

fn bench_export_cycle(c: &mut Criterion) {
    let rt = ViewRuntime::new(RuntimeConfig::default()).unwrap();
    let view = rt.allocate_view("B", vec![1024]).unwrap();

    c.bench_function("export_release_export", |b| {
        b.iter(|| {
            view.export();
            black_box(view.release_export())
        })
    });
    c.bench_function("acquire_export_guard", |b| {
        b.iter(|| drop(black_box(view.acquire_export().unwrap())))
    });
}

fn bench_view_lifecycle(c: &mut Criterion) {
    let rt = ViewRuntime::new(RuntimeConfig::default()).unwrap();
    c.bench_function("allocate_and_release_view", |b| {
        b.iter(|| {
            let view = rt.allocate_view("i", vec![16, 16]).unwrap();
            black_box(rt.release(&view).unwrap())
        })
    });
}

struct Add;

impl ClinicOperation for Add {
    fn name(&self) -> &str {
        "add"
    }

    fn cast_spec(&self, _position: usize) -> Option<CastSpec> {
        Some(CastSpec::new(Conversion::Long))
    }

    fn accepts(&self, _position: usize, kind: PrimitiveKind) -> bool {
        kind == PrimitiveKind::Int
    }

    fn call(&self, args: &[Value]) -> Result<Value, RaisedError> {
        match (&args[0], &args[1]) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(*b))),
            _ => Err(RaisedError::new(ErrorKind::TypeError, "expected ints")),
        }
    }

    fn call_primitive(&self, args: &[Prim]) -> Result<Prim, RaisedError> {
        match (args[0], args[1]) {
            (Prim::Int(a), Prim::Int(b)) => Ok(Prim::Int(a.wrapping_add(b))),
            _ => Err(RaisedError::new(ErrorKind::SystemError, "bad specialization")),
        }
    }
}

fn bench_clinic_dispatch(c: &mut Criterion) {
    let rt = ViewRuntime::new(RuntimeConfig::default()).unwrap();
    let site = rt.binary_clinic(Add);

    c.bench_function("clinic_specialized_i32", |b| {
        b.iter(|| {
            let r: i32 = site.execute2(black_box(3i32), black_box(4i32)).unwrap();
            black_box(r)
        })
    });
    c.bench_function("clinic_generic_i64", |b| {
        b.iter(|| {
            let r: i64 = site.execute2(black_box(3i64), black_box(4i64)).unwrap();
            black_box(r)
        })
    });
}

criterion_group!(
    benches,
    bench_read_as_bytes,
    bench_export_cycle,
    bench_view_lifecycle,
    bench_clinic_dispatch
);
criterion_main!(benches);
