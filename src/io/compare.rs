// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh comparison, used to check that repeated generations agree

use crate::geometry::Mesh;
use serde::{Deserialize, Serialize};

/// Result of mesh comparison
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshComparison {
    pub vertex_count_match: bool,
    pub triangle_count_match: bool,
    pub bbox_match: bool,
    pub vertex_count_diff: i64,
    pub triangle_count_diff: i64,
    /// Largest distance between corresponding vertices; infinite when the
    /// vertex counts differ
    pub max_vertex_deviation: f64,
    /// Triangles whose indices differ
    pub mismatched_triangles: usize,
    pub tolerance: f64,
    pub passed: bool,
}

/// Compare two meshes vertex by vertex and triangle by triangle
pub fn compare_meshes(mesh_a: &Mesh, mesh_b: &Mesh, tolerance: f64) -> MeshComparison {
    let vertex_count_diff = mesh_a.vertex_count() as i64 - mesh_b.vertex_count() as i64;
    let triangle_count_diff = mesh_a.triangle_count() as i64 - mesh_b.triangle_count() as i64;

    let max_vertex_deviation = if vertex_count_diff == 0 {
        mesh_a
            .vertices
            .iter()
            .zip(&mesh_b.vertices)
            .map(|(a, b)| (a.position - b.position).norm())
            .fold(0.0, f64::max)
    } else {
        f64::INFINITY
    };

    let mismatched_triangles = mesh_a
        .triangles
        .iter()
        .zip(&mesh_b.triangles)
        .filter(|(a, b)| a.indices != b.indices)
        .count();

    let bbox_match = mesh_a.bounding_box().approx_eq(&mesh_b.bounding_box(), tolerance);

    let mut comparison = MeshComparison {
        vertex_count_match: vertex_count_diff == 0,
        triangle_count_match: triangle_count_diff == 0,
        bbox_match,
        vertex_count_diff,
        triangle_count_diff,
        max_vertex_deviation,
        mismatched_triangles,
        tolerance,
        passed: false,
    };
    comparison.passed = comparison.vertex_count_match
        && comparison.triangle_count_match
        && comparison.bbox_match
        && comparison.max_vertex_deviation <= tolerance
        && comparison.mismatched_triangles == 0;
    comparison
}
