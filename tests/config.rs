// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use boltforge::{generate, ExportFormat, FastenerError, HeadShape, KitConfig, MeshQuality, QualityPreset, TipShape};
use std::io::Write;

#[test]
fn test_config_file_drives_generation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[fastener]
d = 6.0
pitch = 1.0
head_size = 10.0
head_height = 4.0
length = 12.0
thread_depth = 0.5
head_shape = "hex"
tip_shape = "pointed"
tip_length = 2.0
quantity = 4
has_washer = true
washer_outer_diameter = 12.0

[quality]
ring_minor_segments = 6
ring_major_segments = 12
circle_segments = 24
shaft_segments = 24
"#
    )
    .unwrap();

    let config = KitConfig::from_file(file.path()).unwrap();
    assert_eq!(config.fastener.head_shape, HeadShape::Hex);
    assert_eq!(config.fastener.tip_shape, TipShape::Pointed);
    assert_eq!(config.quality.circle_segments, 24);

    let batch = generate(&config.fastener, &config.quality).unwrap();
    assert_eq!(batch.quantity, 4);
    assert_eq!(batch.parts.len(), 8);
    assert_eq!((batch.grid.columns, batch.grid.rows), (2, 2));
}

#[test]
fn test_saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boltforge.toml");

    let mut config = KitConfig::default();
    config.fastener.has_nut = true;
    config.fastener.quantity = 7;
    config.quality = MeshQuality::preset(QualityPreset::Fine);
    config.save(&path).unwrap();

    assert_eq!(KitConfig::from_file(&path).unwrap(), config);
}

#[test]
fn test_malformed_config_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[fastener]\nquantity = \"many\"\n").unwrap();

    assert!(matches!(KitConfig::from_file(&path), Err(FastenerError::Config { .. })));
    assert!(matches!(
        KitConfig::from_file(dir.path().join("missing.toml")),
        Err(FastenerError::Config { .. })
    ));
}

#[test]
fn test_export_format_names() {
    assert_eq!("3MF".parse::<ExportFormat>().unwrap(), ExportFormat::ThreeMf);
    assert_eq!(" glb ".parse::<ExportFormat>().unwrap(), ExportFormat::Glb);
    assert!("obj".parse::<ExportFormat>().is_err());
}
