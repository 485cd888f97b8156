// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use boltforge::geometry::{extrude, head_profile, loft, socket_profile, subtract, Layer};
use boltforge::io::{export_3mf, export_glb, export_stl_package, merge_by_kind};
use boltforge::params::Dimensions;
use boltforge::parts::{build_bolt, generate_threads, ThreadSpec};
use boltforge::{generate, FastenerParams, HeadShape, MeshQuality, QualityPreset, SocketShape};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::Vector3;

fn bench_threads(c: &mut Criterion) {
    let mut group = c.benchmark_group("threads");
    let params = FastenerParams::default();
    let dims = Dimensions::derive(&params);

    for preset in [QualityPreset::Draft, QualityPreset::Standard, QualityPreset::Fine] {
        let spec = ThreadSpec::external(&params, &dims, &MeshQuality::preset(preset));
        group.bench_with_input(BenchmarkId::new("external", format!("{:?}", preset)), &spec, |b, spec| {
            b.iter(|| generate_threads(black_box(spec)));
        });
    }

    group.finish();
}

fn bench_socket(c: &mut Criterion) {
    let mut group = c.benchmark_group("socket");
    let quality = MeshQuality::default();
    let head = head_profile(HeadShape::Hex, 7.0, quality.circle_segments)
        .and_then(|profile| loft(&profile, &[Layer::flat(0.0), Layer::flat(3.0)]))
        .unwrap();

    for shape in [SocketShape::Hex, SocketShape::Torx, SocketShape::Phillips, SocketShape::Slot] {
        let tool = socket_profile(shape, 7.0)
            .unwrap()
            .map(|profile| extrude(&profile, 2.11).unwrap().translated(&Vector3::new(0.0, 0.0, -0.01)))
            .unwrap();
        group.bench_with_input(BenchmarkId::new("subtract", format!("{:?}", shape)), &tool, |b, tool| {
            b.iter(|| subtract(black_box(&head), black_box(tool)));
        });
    }

    group.finish();
}

fn bench_parts(c: &mut Criterion) {
    let mut group = c.benchmark_group("parts");
    let params = FastenerParams::default();
    let dims = Dimensions::derive(&params);
    let quality = MeshQuality::default();

    group.bench_function("bolt", |b| {
        b.iter(|| build_bolt(black_box(&params), &dims, &quality, 1).unwrap());
    });

    let kit = FastenerParams {
        has_nut: true,
        has_washer: true,
        ..Default::default()
    };
    group.bench_function("kit", |b| {
        b.iter(|| generate(black_box(&kit), &quality).unwrap());
    });

    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    group.sample_size(10);

    for quantity in [1u32, 10, 50] {
        let params = FastenerParams {
            quantity,
            has_nut: true,
            has_washer: true,
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("generate", quantity), &params, |b, params| {
            b.iter(|| generate(black_box(params), &MeshQuality::default()).unwrap());
        });
    }

    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");
    group.sample_size(10);

    let params = FastenerParams {
        quantity: 10,
        has_nut: true,
        has_washer: true,
        ..Default::default()
    };
    let batch = generate(&params, &MeshQuality::default()).unwrap();

    group.bench_function("merge", |b| {
        b.iter(|| merge_by_kind(black_box(&batch)).unwrap());
    });
    group.bench_function("stl_package", |b| {
        b.iter(|| export_stl_package(black_box(&batch)).unwrap());
    });
    group.bench_function("3mf", |b| {
        b.iter(|| export_3mf(black_box(&batch)).unwrap());
    });
    group.bench_function("glb", |b| {
        b.iter(|| export_glb(black_box(&batch)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_threads, bench_socket, bench_parts, bench_layout, bench_export);
criterion_main!(benches);
