// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end generation tests: parts, merging and layout

use approx::assert_relative_eq;
use boltforge::geometry::analytics::signed_volume;
use boltforge::geometry::mesh_utils::validate_mesh;
use boltforge::io::{compare_meshes, merge_by_kind, merge_part};
use boltforge::params::Dimensions;
use boltforge::{generate, FastenerParams, HeadShape, MeshQuality, PartKind, SocketShape, TipShape};

fn m4_socket_bolt() -> FastenerParams {
    FastenerParams {
        d: 4.0,
        pitch: 0.7,
        head_size: 7.0,
        head_height: 3.0,
        length: 20.0,
        thread_depth: 0.35,
        head_shape: HeadShape::Round,
        socket_shape: SocketShape::Hex,
        socket_depth_fraction: 0.7,
        tip_shape: TipShape::Flat,
        quantity: 1,
        has_nut: false,
        has_washer: false,
        nozzle_size: 0.4,
        ..Default::default()
    }
}

#[test]
fn test_m4_socket_bolt_scenario() {
    let params = m4_socket_bolt();
    let batch = generate(&params, &MeshQuality::default()).unwrap();

    assert_eq!(batch.parts.len(), 1);
    let bolt = &batch.parts[0];
    assert_eq!(bolt.kind, PartKind::Bolt);
    assert!(bolt.warnings.is_empty(), "{:?}", bolt.warnings);
    // head + shaft + 28 rings
    assert_eq!(bolt.solids.len(), 30);

    let dims = Dimensions::derive(&params);
    assert_relative_eq!(dims.shaft_radius, 1.45, epsilon = 1e-9);
    assert_eq!(dims.thread_rings, 28);

    let merged = merge_part(bolt).unwrap();
    let validation = validate_mesh(&merged);
    assert!(validation.is_manifold);
    assert!(validation.is_closed);
    assert!(validation.has_consistent_winding);
}

#[test]
fn test_socket_cavity_dimensions() {
    let params = m4_socket_bolt();
    let batch = generate(&params, &MeshQuality::default()).unwrap();
    let head = &batch.parts[0].solids[0];

    // Cavity floor sits at the socket depth, its corners on the 2.1 mm hexagon
    let floor: Vec<_> = head
        .vertices
        .iter()
        .filter(|v| (v.position.z - 2.1).abs() < 1e-6)
        .map(|v| v.position.coords.xy().norm())
        .collect();
    assert!(!floor.is_empty());
    let widest = floor.iter().cloned().fold(0.0, f64::max);
    assert_relative_eq!(widest, 2.1, epsilon = 1e-6);

    let uncarved = generate(
        &FastenerParams {
            socket_shape: SocketShape::None,
            ..params
        },
        &MeshQuality::default(),
    )
    .unwrap();
    let plain_head = &uncarved.parts[0].solids[0];
    assert!(head.triangle_count() > plain_head.triangle_count());
    assert!(signed_volume(head) < signed_volume(plain_head));
}

#[test]
fn test_every_socket_is_carved_into_every_head() {
    let heads = [HeadShape::Hex, HeadShape::Square, HeadShape::Round, HeadShape::Button, HeadShape::Countersunk];
    let sockets = [SocketShape::Hex, SocketShape::Torx, SocketShape::Phillips, SocketShape::Slot];

    for head_shape in heads {
        let plain = generate(
            &FastenerParams {
                head_shape,
                socket_shape: SocketShape::None,
                ..m4_socket_bolt()
            },
            &MeshQuality::default(),
        )
        .unwrap();
        let plain_head = &plain.parts[0].solids[0];

        for socket_shape in sockets {
            let batch = generate(
                &FastenerParams {
                    head_shape,
                    socket_shape,
                    ..m4_socket_bolt()
                },
                &MeshQuality::default(),
            )
            .unwrap();
            let bolt = &batch.parts[0];
            let head = &bolt.solids[0];

            assert!(
                bolt.warnings.is_empty(),
                "{:?} socket in {:?} head fell back: {:?}",
                socket_shape,
                head_shape,
                bolt.warnings
            );
            assert!(
                head.triangle_count() > plain_head.triangle_count(),
                "{:?} socket in {:?} head added no faces",
                socket_shape,
                head_shape
            );
            assert!(
                signed_volume(head) < signed_volume(plain_head),
                "{:?} socket in {:?} head removed no material",
                socket_shape,
                head_shape
            );
            assert!(validate_mesh(head).is_closed);
        }
    }
}

#[test]
fn test_nut_scenario() {
    let params = FastenerParams {
        has_nut: true,
        nut_height: 3.2,
        ..m4_socket_bolt()
    };
    let batch = generate(&params, &MeshQuality::default()).unwrap();

    let kinds: Vec<_> = batch.parts.iter().map(|p| p.kind).collect();
    assert_eq!(kinds, vec![PartKind::Bolt, PartKind::Nut]);
    assert_relative_eq!(Dimensions::derive(&params).bore_radius, 2.35, epsilon = 1e-9);

    let nut = merge_part(&batch.parts[1]).unwrap();
    assert!(validate_mesh(&nut).is_closed);
    let innermost = nut
        .vertices
        .iter()
        .map(|v| v.position.coords.xy().norm())
        .fold(f64::INFINITY, f64::min);
    // Thread rings reach one thread depth into the bore
    assert!(innermost > 2.35 - 0.35 - 1e-9);
    assert!(innermost < 2.35);
}

#[test]
fn test_every_part_merges_to_closed_solid() {
    for head_shape in [HeadShape::Hex, HeadShape::Square, HeadShape::Round, HeadShape::Button, HeadShape::Countersunk] {
        for tip_shape in [TipShape::Flat, TipShape::Pointed, TipShape::DogPoint] {
            let params = FastenerParams {
                head_shape,
                tip_shape,
                tip_length: 2.0,
                has_nut: true,
                has_washer: true,
                ..Default::default()
            };
            let batch = generate(&params, &MeshQuality::preset(boltforge::QualityPreset::Draft)).unwrap();
            for (kind, mesh) in merge_by_kind(&batch).unwrap() {
                let validation = validate_mesh(&mesh);
                assert!(
                    validation.is_closed && validation.has_consistent_winding,
                    "{:?} with {:?} head and {:?} tip: {:?}",
                    kind,
                    head_shape,
                    tip_shape,
                    validation
                );
            }
        }
    }
}

#[test]
fn test_generation_is_idempotent() {
    let params = FastenerParams {
        quantity: 2,
        has_nut: true,
        has_washer: true,
        socket_shape: SocketShape::Torx,
        ..Default::default()
    };
    let first = merge_by_kind(&generate(&params, &MeshQuality::default()).unwrap()).unwrap();
    let second = merge_by_kind(&generate(&params, &MeshQuality::default()).unwrap()).unwrap();

    assert_eq!(first.len(), second.len());
    for (kind, mesh) in &first {
        let comparison = compare_meshes(mesh, &second[kind], 1e-12);
        assert!(comparison.passed, "{:?}: {:?}", kind, comparison);
    }
}

#[test]
fn test_quantity_five_layout() {
    let params = FastenerParams {
        quantity: 5,
        has_nut: true,
        has_washer: true,
        ..Default::default()
    };
    let batch = generate(&params, &MeshQuality::default()).unwrap();

    assert_eq!(batch.grid.columns, 3);
    assert_eq!(batch.grid.rows, 2);
    assert_eq!(batch.parts.len(), 15);
    assert!(batch.verify_clearance().is_ok());

    for kit in 1..=5 {
        assert_eq!(batch.kit(kit).count(), 3);
    }

    // Kits on a row are one kit pitch apart
    let bolt = |kit: usize| batch.kit(kit).next().unwrap().offset;
    assert_relative_eq!(bolt(2).x - bolt(1).x, 3.0 * batch.slot, epsilon = 1e-9);
    assert_relative_eq!(bolt(4).y - bolt(1).y, 2.0 * batch.slot, epsilon = 1e-9);

    let center = batch.bounds().center();
    assert!(center.coords.norm() < 1e-9);
}

#[test]
fn test_tolerance_shrinks_shaft_as_nozzle_grows() {
    let radii: Vec<f64> = [0.2, 0.4, 0.6, 0.8]
        .iter()
        .map(|&nozzle_size| {
            Dimensions::derive(&FastenerParams {
                nozzle_size,
                ..Default::default()
            })
            .shaft_radius
        })
        .collect();
    assert!(radii.windows(2).all(|pair| pair[1] < pair[0]));
}
