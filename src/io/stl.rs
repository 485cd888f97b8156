// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Binary STL encoding and the per-part STL package

use super::merge::merge_by_kind;
use super::{archive_options, ensure_not_empty};
use crate::error::{FastenerError, Result};
use crate::geometry::Mesh;
use crate::layout::KitLayout;
use nalgebra::Vector3;
use std::io::{Cursor, Write};
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};
use tracing::info;
use zip::ZipWriter;

const FORMAT: &str = "stl";

fn to_f32(x: f64, y: f64, z: f64) -> [f32; 3] {
    [x as f32, y as f32, z as f32]
}

/// Encode a mesh as binary STL: 80-byte header, triangle count, then one
/// 50-byte record per triangle
pub fn stl_bytes(mesh: &Mesh, label: &str) -> Result<Vec<u8>> {
    ensure_not_empty(mesh, label, "stl export")?;

    let triangles: Vec<StlTriangle> = mesh
        .triangles
        .iter()
        .map(|tri| {
            let [a, b, c] = mesh.corners(tri);
            let normal = mesh.face_normal(tri).unwrap_or_else(Vector3::zeros);

            StlTriangle {
                normal: Normal::new(to_f32(normal.x, normal.y, normal.z)),
                vertices: [
                    StlVertex::new(to_f32(a.x, a.y, a.z)),
                    StlVertex::new(to_f32(b.x, b.y, b.z)),
                    StlVertex::new(to_f32(c.x, c.y, c.z)),
                ],
            }
        })
        .collect();

    let mut bytes = Vec::with_capacity(84 + 50 * triangles.len());
    stl_io::write_stl(&mut bytes, triangles.iter()).map_err(|e| FastenerError::serialization(FORMAT, e))?;
    Ok(bytes)
}

/// ZIP archive holding `bolt_{n}.stl`, `nut_{n}.stl` and `washer_{n}.stl` for
/// every part of the batch, each in its own local frame
pub fn export_stl_package(layout: &KitLayout) -> Result<Vec<u8>> {
    let meshes = merge_by_kind(layout)?;
    let mut encoded = Vec::with_capacity(meshes.len());
    for (kind, mesh) in &meshes {
        encoded.push((*kind, stl_bytes(mesh, kind.label())?));
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for part in &layout.parts {
        let Some((_, bytes)) = encoded.iter().find(|(kind, _)| *kind == part.kind) else {
            continue;
        };
        zip.start_file(format!("{}.stl", part.file_stem()), archive_options())
            .map_err(|e| FastenerError::serialization(FORMAT, e))?;
        zip.write_all(bytes).map_err(|e| FastenerError::serialization(FORMAT, e))?;
    }

    let archive = zip
        .finish()
        .map_err(|e| FastenerError::serialization(FORMAT, e))?
        .into_inner();

    info!(files = layout.parts.len(), bytes = archive.len(), "STL package written");
    Ok(archive)
}
