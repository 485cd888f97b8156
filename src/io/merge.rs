// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Merge a part's solids into one welded, export-ready mesh

use crate::error::{FastenerError, Result};
use crate::geometry::Mesh;
use crate::layout::KitLayout;
use crate::parts::{Part, PartKind};
use std::collections::BTreeMap;
use tracing::debug;

/// Vertices closer than this are treated as one
pub const WELD_EPSILON: f64 = 1e-4;

/// De-index, concatenate and weld `solids`.
///
/// Cap triangles shared by touching sub-solids (shaft end and tip base)
/// face opposite ways after welding and cancel out, which leaves a single
/// closed surface.
pub fn merge(solids: &[Mesh], label: &str) -> Result<Mesh> {
    let mut merged = Mesh::new();
    for solid in solids {
        merged.merge(&solid.unindexed());
    }
    if merged.triangles.is_empty() {
        return Err(FastenerError::empty(label, "merge"));
    }

    let welded = merged.weld_vertices(WELD_EPSILON);
    let degenerate = merged.remove_degenerate_triangles();
    let duplicates = merged.remove_duplicate_triangles();
    merged.remove_orphaned_vertices();

    if merged.triangles.is_empty() {
        return Err(FastenerError::empty(label, "merge"));
    }
    merged.recompute_normals();

    debug!(
        part = label,
        solids = solids.len(),
        welded,
        degenerate,
        duplicates,
        vertices = merged.vertex_count(),
        triangles = merged.triangle_count(),
        "merged solids"
    );
    Ok(merged)
}

/// Merge a part in its local frame
pub fn merge_part(part: &Part) -> Result<Mesh> {
    merge(&part.solids, &part.name())
}

/// One merged mesh per part kind. Every kit of a layout is built from the
/// same template, so the first part of each kind stands for all of them.
pub fn merge_by_kind(layout: &KitLayout) -> Result<BTreeMap<PartKind, Mesh>> {
    let mut meshes = BTreeMap::new();
    for part in &layout.parts {
        if !meshes.contains_key(&part.kind) {
            meshes.insert(part.kind, merge_part(part)?);
        }
    }
    if meshes.is_empty() {
        return Err(FastenerError::empty("batch", "merge"));
    }
    Ok(meshes)
}
