// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - merging parts and encoding export artifacts.
//!
//! Every exporter builds the complete artifact in memory and returns it as
//! bytes; nothing is written unless the whole encoding succeeded.

mod compare;
mod export_3mf;
mod export_gltf;
mod merge;
mod stl;

pub use compare::{compare_meshes, MeshComparison};
pub use export_3mf::{export_3mf, export_3mf_at};
pub use export_gltf::{export_glb, export_gltf};
pub use merge::{merge, merge_by_kind, merge_part, WELD_EPSILON};
pub use stl::{export_stl_package, stl_bytes};

use crate::error::{FastenerError, Result};
use crate::geometry::Mesh;
use crate::layout::KitLayout;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

/// Export artifact kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// ZIP of binary STL files, one per part
    Stl,
    ThreeMf,
    Gltf,
    Glb,
}

impl ExportFormat {
    /// File extension of the produced artifact
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Stl => "zip",
            Self::ThreeMf => "3mf",
            Self::Gltf => "gltf",
            Self::Glb => "glb",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stl => "stl",
            Self::ThreeMf => "3mf",
            Self::Gltf => "gltf",
            Self::Glb => "glb",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = FastenerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stl" => Ok(Self::Stl),
            "3mf" => Ok(Self::ThreeMf),
            "gltf" => Ok(Self::Gltf),
            "glb" => Ok(Self::Glb),
            other => Err(FastenerError::Config {
                details: format!("unknown export format `{}` (expected stl, 3mf, gltf or glb)", other),
            }),
        }
    }
}

/// Encode a laid-out batch in the requested format
pub fn export(layout: &KitLayout, format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Stl => export_stl_package(layout),
        ExportFormat::ThreeMf => export_3mf(layout),
        ExportFormat::Gltf => export_gltf(layout),
        ExportFormat::Glb => export_glb(layout),
    }
}

/// Deflate entries with a fixed timestamp so archives are reproducible
pub(crate) fn archive_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default())
}

pub(crate) fn ensure_not_empty(mesh: &Mesh, label: &str, stage: &'static str) -> Result<()> {
    if mesh.vertices.is_empty() || mesh.triangles.is_empty() {
        return Err(FastenerError::empty(label, stage));
    }
    Ok(())
}
