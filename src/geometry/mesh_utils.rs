// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh topology validation

use super::Mesh;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Undirected edge, smaller index first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub v0: usize,
    pub v1: usize,
}

impl Edge {
    pub fn new(v0: usize, v1: usize) -> Self {
        if v0 < v1 {
            Self { v0, v1 }
        } else {
            Self { v0: v1, v1: v0 }
        }
    }
}

/// Build edge count map for a mesh
pub fn build_edge_counts(mesh: &Mesh) -> AHashMap<Edge, u32> {
    let mut edge_counts: AHashMap<Edge, u32> = AHashMap::with_capacity(mesh.triangles.len() * 2);

    for triangle in &mesh.triangles {
        let [a, b, c] = triangle.indices;
        for edge in [Edge::new(a, b), Edge::new(b, c), Edge::new(c, a)] {
            *edge_counts.entry(edge).or_insert(0) += 1;
        }
    }

    edge_counts
}

/// Check if mesh is manifold (each edge shared by at most 2 triangles)
pub fn is_manifold(mesh: &Mesh) -> bool {
    build_edge_counts(mesh).values().all(|&count| count <= 2)
}

/// Check if mesh is closed (each edge shared by exactly 2 triangles)
pub fn is_closed(mesh: &Mesh) -> bool {
    !mesh.triangles.is_empty() && build_edge_counts(mesh).values().all(|&count| count == 2)
}

/// Every directed edge must appear exactly once, so neighbouring triangles
/// traverse their shared edge in opposite directions.
pub fn has_consistent_winding(mesh: &Mesh) -> bool {
    let mut directed: AHashMap<(usize, usize), u32> = AHashMap::with_capacity(mesh.triangles.len() * 3);
    for triangle in &mesh.triangles {
        let [a, b, c] = triangle.indices;
        for edge in [(a, b), (b, c), (c, a)] {
            let count = directed.entry(edge).or_insert(0);
            *count += 1;
            if *count > 1 {
                return false;
            }
        }
    }
    true
}

/// Mesh validation report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshValidation {
    pub is_manifold: bool,
    pub is_closed: bool,
    pub has_consistent_winding: bool,
    pub edge_count: usize,
    pub boundary_edge_count: usize,
    /// Edges shared by three or more triangles
    pub overshared_edge_count: usize,
}

pub fn validate_mesh(mesh: &Mesh) -> MeshValidation {
    let edge_counts = build_edge_counts(mesh);

    let boundary_edges = edge_counts.values().filter(|&&count| count == 1).count();
    let overshared_edges = edge_counts.values().filter(|&&count| count > 2).count();

    MeshValidation {
        is_manifold: overshared_edges == 0,
        is_closed: !mesh.triangles.is_empty() && boundary_edges == 0 && overshared_edges == 0,
        has_consistent_winding: has_consistent_winding(mesh),
        edge_count: edge_counts.len(),
        boundary_edge_count: boundary_edges,
        overshared_edge_count: overshared_edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Primitive, Triangle};

    #[test]
    fn test_cylinder_is_closed() {
        let mesh = Primitive::cylinder(10.0, 5.0, 32).to_mesh();
        assert!(is_manifold(&mesh), "Cylinder should be manifold");
        assert!(is_closed(&mesh), "Cylinder should be closed");
    }

    #[test]
    fn test_validate_closed_mesh() {
        let mesh = Primitive::torus(5.0, 1.0, 12, 32).to_mesh();
        let validation = validate_mesh(&mesh);

        assert!(validation.is_manifold, "Torus should be manifold");
        assert!(validation.is_closed, "Torus should be closed");
        assert!(validation.has_consistent_winding);
        assert_eq!(validation.boundary_edge_count, 0, "Closed mesh should have no boundary edges");
    }

    #[test]
    fn test_open_mesh_reports_boundary() {
        let mut mesh = Primitive::cone(4.0, 2.0, 32).to_mesh();
        mesh.triangles.pop();
        let validation = validate_mesh(&mesh);

        assert!(validation.is_manifold);
        assert!(!validation.is_closed);
        assert_eq!(validation.boundary_edge_count, 3);
    }

    #[test]
    fn test_flipped_triangle_breaks_winding() {
        let mut mesh = Primitive::cylinder(10.0, 5.0, 16).to_mesh();
        let [a, b, c] = mesh.triangles[0].indices;
        mesh.triangles[0] = Triangle::new([a, c, b]);
        assert!(is_closed(&mesh));
        assert!(!has_consistent_winding(&mesh));
    }

    #[test]
    fn test_empty_mesh_is_not_closed() {
        assert!(!is_closed(&Mesh::new()));
    }
}
