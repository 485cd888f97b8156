// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Randomized parameter sweep: every valid input must yield closed parts

use boltforge::geometry::mesh_utils::validate_mesh;
use boltforge::io::merge_by_kind;
use boltforge::{generate, FastenerParams, HeadShape, MeshQuality, QualityPreset, SocketShape, TipShape};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const HEADS: [HeadShape; 5] = [
    HeadShape::Hex,
    HeadShape::Square,
    HeadShape::Round,
    HeadShape::Button,
    HeadShape::Countersunk,
];
const SOCKETS: [SocketShape; 5] = [
    SocketShape::None,
    SocketShape::Hex,
    SocketShape::Torx,
    SocketShape::Phillips,
    SocketShape::Slot,
];
const TIPS: [TipShape; 3] = [TipShape::Flat, TipShape::Pointed, TipShape::DogPoint];

fn random_params(rng: &mut StdRng) -> FastenerParams {
    let d = rng.gen_range(3.0..10.0);
    let pitch = d * rng.gen_range(0.15..0.2);
    FastenerParams {
        d,
        pitch,
        head_size: d * rng.gen_range(1.6..2.0),
        head_height: d * rng.gen_range(0.6..0.9),
        length: rng.gen_range(2.0 * d..4.0 * d),
        thread_depth: d * rng.gen_range(0.05..0.12),
        head_shape: HEADS[rng.gen_range(0..HEADS.len())],
        socket_shape: SOCKETS[rng.gen_range(0..SOCKETS.len())],
        socket_depth_fraction: rng.gen_range(0.3..0.7),
        tip_shape: TIPS[rng.gen_range(0..TIPS.len())],
        tip_length: d * rng.gen_range(0.3..0.8),
        nozzle_size: rng.gen_range(0.2..0.8),
        quantity: 1,
        has_nut: rng.gen_bool(0.5),
        nut_height: d * rng.gen_range(0.6..0.9),
        has_washer: rng.gen_bool(0.5),
        washer_thickness: rng.gen_range(0.8..2.0),
        washer_outer_diameter: d * rng.gen_range(2.0..2.4),
    }
}

#[test]
fn test_random_parameters_give_closed_parts() {
    let mut rng = StdRng::seed_from_u64(0x0b017);
    let quality = MeshQuality::preset(QualityPreset::Draft);

    for _ in 0..12 {
        let params = random_params(&mut rng);
        assert!(params.validate().is_ok(), "{:?}", params);

        let batch = generate(&params, &quality).unwrap();
        assert_eq!(batch.parts.len(), params.parts_per_kit());

        for (kind, mesh) in merge_by_kind(&batch).unwrap() {
            let validation = validate_mesh(&mesh);
            assert!(
                validation.is_closed && validation.has_consistent_winding,
                "{:?} not closed for {:?}: {:?}",
                kind,
                params,
                validation
            );
        }
    }
}

#[test]
fn test_random_parameters_are_rejected_when_threads_overrun() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let params = FastenerParams {
            thread_depth: rng.gen_range(2.0..5.0),
            ..Default::default()
        };
        assert!(generate(&params, &MeshQuality::default()).is_err());
    }
}
