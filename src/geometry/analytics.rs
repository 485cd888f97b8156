// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry analytics and statistics

use super::mesh_utils::is_closed;
use super::Mesh;
use serde::{Deserialize, Serialize};

/// Geometry statistics and analytics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryStats {
    /// Enclosed volume in cubic millimeters
    pub volume: f64,
    /// Total surface area in square millimeters
    pub surface_area: f64,
    /// Bounding box [min_x, min_y, min_z, max_x, max_y, max_z]
    pub bbox: [f64; 6],
    /// Mean vertex position [x, y, z]
    pub centroid: [f64; 3],
    pub vertex_count: usize,
    pub triangle_count: usize,
    /// Every edge shared by exactly two triangles
    pub is_watertight: bool,
}

impl GeometryStats {
    pub fn empty() -> Self {
        Self {
            volume: 0.0,
            surface_area: 0.0,
            bbox: [0.0; 6],
            centroid: [0.0; 3],
            vertex_count: 0,
            triangle_count: 0,
            is_watertight: false,
        }
    }

    /// Width, depth and height of the bounding box
    pub fn size(&self) -> [f64; 3] {
        [
            self.bbox[3] - self.bbox[0],
            self.bbox[4] - self.bbox[1],
            self.bbox[5] - self.bbox[2],
        ]
    }
}

/// Analyze mesh geometry and compute statistics
pub fn analyze(mesh: &Mesh) -> GeometryStats {
    let vertex_count = mesh.vertices.len();
    let triangle_count = mesh.triangles.len();

    if vertex_count == 0 || triangle_count == 0 {
        return GeometryStats::empty();
    }

    GeometryStats {
        volume: signed_volume(mesh).abs(),
        surface_area: surface_area(mesh),
        bbox: mesh.bounding_box().to_array(),
        centroid: vertex_centroid(mesh),
        vertex_count,
        triangle_count,
        is_watertight: is_closed(mesh),
    }
}

/// Signed volume from the divergence theorem; positive when the surface is
/// wound counter-clockwise seen from outside.
pub fn signed_volume(mesh: &Mesh) -> f64 {
    mesh.triangles
        .iter()
        .map(|triangle| {
            let [v0, v1, v2] = mesh.corners(triangle);
            // Signed volume of tetrahedron formed by triangle and origin
            v0.coords.dot(&v1.coords.cross(&v2.coords)) / 6.0
        })
        .sum()
}

pub fn surface_area(mesh: &Mesh) -> f64 {
    mesh.triangles
        .iter()
        .map(|triangle| {
            let [v0, v1, v2] = mesh.corners(triangle);
            (v1 - v0).cross(&(v2 - v0)).norm() / 2.0
        })
        .sum()
}

fn vertex_centroid(mesh: &Mesh) -> [f64; 3] {
    let sum = mesh
        .vertices
        .iter()
        .fold(nalgebra::Vector3::zeros(), |acc, v| acc + v.position.coords);
    let mean = sum / mesh.vertices.len() as f64;
    [mean.x, mean.y, mean.z]
}
