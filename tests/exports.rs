// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Export artifacts decoded back through their own readers

use boltforge::io::{export_3mf_at, export_gltf, merge_by_kind, stl_bytes};
use boltforge::{generate, generate_package, ExportFormat, FastenerError, FastenerParams, Mesh, MeshQuality, PartKind};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::io::{Cursor, Read};
use zip::ZipArchive;

fn kit_params(quantity: u32) -> FastenerParams {
    FastenerParams {
        quantity,
        has_nut: true,
        ..Default::default()
    }
}

fn entry_names(archive: &[u8]) -> Vec<String> {
    let zip = ZipArchive::new(Cursor::new(archive)).unwrap();
    let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
    names.sort_unstable();
    names
}

#[test]
fn test_stl_package_holds_one_file_per_part() {
    let package = generate_package(&kit_params(1), &MeshQuality::default(), ExportFormat::Stl).unwrap();
    assert_eq!(entry_names(&package), vec!["bolt_1.stl", "nut_1.stl"]);

    let mut zip = ZipArchive::new(Cursor::new(package.as_slice())).unwrap();
    for name in ["bolt_1.stl", "nut_1.stl"] {
        let mut bytes = Vec::new();
        zip.by_name(name).unwrap().read_to_end(&mut bytes).unwrap();

        let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
        assert!(count > 0);
        assert_eq!(bytes.len(), 84 + 50 * count, "{}", name);

        let decoded = stl_io::read_stl(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(decoded.faces.len(), count);
    }
}

#[test]
fn test_stl_package_names_every_kit() {
    let params = FastenerParams {
        has_washer: true,
        ..kit_params(3)
    };
    let package = generate_package(&params, &MeshQuality::default(), ExportFormat::Stl).unwrap();
    let names = entry_names(&package);

    assert_eq!(names.len(), 9);
    for kit in 1..=3 {
        for kind in ["bolt", "nut", "washer"] {
            assert!(names.contains(&format!("{}_{}.stl", kind, kit)));
        }
    }
}

#[test]
fn test_stl_files_are_local_frame() {
    // Every kit shares the template, so copies are byte-identical
    let package = generate_package(&kit_params(2), &MeshQuality::default(), ExportFormat::Stl).unwrap();
    let mut zip = ZipArchive::new(Cursor::new(package.as_slice())).unwrap();

    let mut read = |name: &str| {
        let mut bytes = Vec::new();
        zip.by_name(name).unwrap().read_to_end(&mut bytes).unwrap();
        bytes
    };
    assert_eq!(read("bolt_1.stl"), read("bolt_2.stl"));
}

#[test]
fn test_stl_rejects_empty_mesh() {
    match stl_bytes(&Mesh::new(), "bolt") {
        Err(FastenerError::EmptyResult { part, .. }) => assert_eq!(part, "bolt"),
        other => panic!("expected EmptyResult, got {:?}", other.map(|b| b.len())),
    }
}

#[test]
fn test_3mf_package() {
    let batch = generate(&kit_params(2), &MeshQuality::default()).unwrap();
    let created = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
    let package = export_3mf_at(&batch, created).unwrap();

    assert_eq!(
        entry_names(&package),
        vec!["3D/3dmodel.model", "[Content_Types].xml", "_rels/.rels"]
    );

    let mut zip = ZipArchive::new(Cursor::new(package.as_slice())).unwrap();
    let mut model = String::new();
    zip.by_name("3D/3dmodel.model")
        .unwrap()
        .read_to_string(&mut model)
        .unwrap();

    assert!(model.contains("2025-03-14"));
    assert!(model.contains(&batch.fingerprint));
    assert_eq!(model.matches("<object ").count(), 4);
    assert_eq!(model.matches("<item ").count(), 4);
    for name in ["Bolt_1", "Nut_1", "Bolt_2", "Nut_2"] {
        assert!(model.contains(&format!("name=\"{}\"", name)), "{}", name);
    }

    // Same inputs and date give the same bytes
    assert_eq!(export_3mf_at(&batch, created).unwrap(), package);
}

#[test]
fn test_gltf_scene_hierarchy() {
    let batch = generate(&kit_params(2), &MeshQuality::default()).unwrap();
    let gltf: Value = serde_json::from_slice(&export_gltf(&batch).unwrap()).unwrap();

    assert_eq!(gltf["asset"]["version"], "2.0");
    let nodes = gltf["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 7);
    assert_eq!(nodes[0]["name"], "Batch");

    let kit_names: Vec<&str> = nodes[0]["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| nodes[i.as_u64().unwrap() as usize]["name"].as_str().unwrap())
        .collect();
    assert_eq!(kit_names, vec!["Kit_1", "Kit_2"]);

    // One shared mesh per part kind
    let meshes = gltf["meshes"].as_array().unwrap();
    assert_eq!(meshes.len(), merge_by_kind(&batch).unwrap().len());
    assert_eq!(meshes[0]["name"], PartKind::Bolt.display_name());

    let uri = gltf["buffers"][0]["uri"].as_str().unwrap();
    assert!(uri.starts_with("data:application/octet-stream;base64,"));
}

#[test]
fn test_glb_chunks() {
    let glb = generate_package(&kit_params(1), &MeshQuality::default(), ExportFormat::Glb).unwrap();

    assert_eq!(&glb[0..4], b"glTF");
    let word = |offset: usize| u32::from_le_bytes([glb[offset], glb[offset + 1], glb[offset + 2], glb[offset + 3]]);
    assert_eq!(word(4), 2);
    assert_eq!(word(8) as usize, glb.len());

    let json_length = word(12) as usize;
    assert_eq!(json_length % 4, 0);
    assert_eq!(&glb[16..20], b"JSON");

    let bin_header = 20 + json_length;
    assert_eq!(&glb[bin_header + 4..bin_header + 8], b"BIN\0");
    assert_eq!(bin_header + 8 + word(bin_header) as usize, glb.len());

    let gltf: Value = serde_json::from_slice(&glb[20..bin_header]).unwrap();
    assert_eq!(gltf["buffers"][0]["byteLength"].as_u64().unwrap() as u32, word(bin_header));
}

#[test]
fn test_invalid_params_produce_no_artifact() {
    let params = FastenerParams {
        thread_depth: 2.5,
        ..Default::default()
    };
    for format in [ExportFormat::Stl, ExportFormat::ThreeMf, ExportFormat::Gltf, ExportFormat::Glb] {
        assert!(matches!(
            generate_package(&params, &MeshQuality::default(), format),
            Err(FastenerError::InvalidParams { .. })
        ));
    }
}
