// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Linear extrusion and lofting of profiles along +Z

use super::profile::Profile2D;
use super::triangulate::triangulate;
use super::{Mesh, Triangle};
use crate::error::{FastenerError, Result};
use nalgebra::Point3;
use tracing::debug;

/// One cross-section of a loft. The outer loop and the holes are scaled
/// about the origin independently, which models frustums and chamfers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    pub z: f64,
    pub outer_scale: f64,
    pub hole_scale: f64,
}

impl Layer {
    pub fn new(z: f64, outer_scale: f64, hole_scale: f64) -> Self {
        Self {
            z,
            outer_scale,
            hole_scale,
        }
    }

    pub fn flat(z: f64) -> Self {
        Self::new(z, 1.0, 1.0)
    }
}

/// Sweep a profile from z = 0 to z = depth, capping both ends
pub fn extrude(profile: &Profile2D, depth: f64) -> Result<Mesh> {
    if !depth.is_finite() || depth <= 0.0 {
        return Err(FastenerError::degenerate(
            "extrude",
            format!("extrusion depth must be positive, got {}", depth),
        ));
    }
    loft(profile, &[Layer::flat(0.0), Layer::flat(depth)])
}

/// Connect two or more layers of the same profile with side walls.
///
/// Layers must be ordered by strictly increasing z. The lowest layer is
/// capped facing -Z and the highest facing +Z.
pub fn loft(profile: &Profile2D, layers: &[Layer]) -> Result<Mesh> {
    if layers.len() < 2 {
        return Err(FastenerError::degenerate("loft", "at least two layers are required"));
    }
    if layers.windows(2).any(|pair| !(pair[1].z > pair[0].z)) {
        return Err(FastenerError::degenerate("loft", "layer heights must strictly increase"));
    }

    // Every layer must still be a valid profile, e.g. a chamfer may not close the bore
    let sections: Vec<Profile2D> = layers
        .iter()
        .map(|layer| profile.scaled(layer.outer_scale, layer.hole_scale))
        .collect::<Result<_>>()?;

    let per_layer = profile.point_count();
    if sections.iter().any(|section| section.point_count() != per_layer) {
        return Err(FastenerError::degenerate("loft", "layer scaling collapsed profile points"));
    }
    let mut mesh = Mesh::with_capacity(per_layer * layers.len(), per_layer * 2 * layers.len());

    for (section, layer) in sections.iter().zip(layers) {
        for point in section.contours().flatten() {
            mesh.add_point(Point3::new(point.x, point.y, layer.z));
        }
    }

    let bottom_cap = triangulate(&sections[0])?;
    for [a, b, c] in bottom_cap {
        mesh.add_triangle(Triangle::new([a, c, b]));
    }

    let top = per_layer * (layers.len() - 1);
    let top_cap = triangulate(&sections[sections.len() - 1])?;
    for [a, b, c] in top_cap {
        mesh.add_triangle(Triangle::new([top + a, top + b, top + c]));
    }

    // Side walls face outward for the CCW outer loop and the CW holes alike
    for level in 0..layers.len() - 1 {
        let lower = level * per_layer;
        let upper = lower + per_layer;
        let mut contour_start = 0;
        for contour in profile.contours() {
            let n = contour.len();
            for i in 0..n {
                let j = (i + 1) % n;
                let (bi, bj) = (lower + contour_start + i, lower + contour_start + j);
                let (ti, tj) = (upper + contour_start + i, upper + contour_start + j);
                mesh.add_triangle(Triangle::new([bi, bj, tj]));
                mesh.add_triangle(Triangle::new([bi, tj, ti]));
            }
            contour_start += n;
        }
    }

    mesh.recompute_normals();
    debug!(
        layers = layers.len(),
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "lofted profile"
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::analytics::signed_volume;
    use crate::geometry::mesh_utils::validate_mesh;
    use crate::geometry::profile::{circle, regular_polygon};
    use approx::assert_relative_eq;

    #[test]
    fn test_extruded_hexagon_is_closed() {
        let profile = Profile2D::polygon(&regular_polygon(6, 3.5, 30.0)).unwrap();
        let mesh = extrude(&profile, 3.0).unwrap();

        let validation = validate_mesh(&mesh);
        assert!(validation.is_closed);
        assert!(validation.has_consistent_winding);
        assert_relative_eq!(signed_volume(&mesh), profile.area() * 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_hole_becomes_through_bore() {
        let profile = Profile2D::new(&regular_polygon(6, 3.5, 30.0), &[circle(2.35, 64)]).unwrap();
        let mesh = extrude(&profile, 3.2).unwrap();

        let validation = validate_mesh(&mesh);
        assert!(validation.is_closed);
        assert!(validation.has_consistent_winding);
        assert_relative_eq!(signed_volume(&mesh), profile.area() * 3.2, epsilon = 1e-6);
    }

    #[test]
    fn test_frustum_volume() {
        let profile = Profile2D::polygon(&circle(3.5, 64)).unwrap();
        let mesh = loft(&profile, &[Layer::flat(0.0), Layer::new(3.0, 0.6, 1.0)]).unwrap();
        assert!(validate_mesh(&mesh).is_closed);

        // Frustum volume: h/3 · (A1 + A2 + sqrt(A1·A2))
        let a1 = profile.area();
        let a2 = a1 * 0.36;
        let expected = 3.0 / 3.0 * (a1 + a2 + (a1 * a2).sqrt());
        assert_relative_eq!(signed_volume(&mesh), expected, max_relative = 1e-9);
    }

    #[test]
    fn test_degenerate_input_is_rejected() {
        let profile = Profile2D::polygon(&regular_polygon(4, 1.0, 45.0)).unwrap();
        assert!(matches!(
            extrude(&profile, 0.0),
            Err(FastenerError::GeometryDegenerate { .. })
        ));
        assert!(loft(&profile, &[Layer::flat(1.0), Layer::flat(1.0)]).is_err());
        assert!(loft(&profile, &[Layer::flat(0.0)]).is_err());
    }

    #[test]
    fn test_chamfer_closing_the_bore_is_rejected() {
        let profile = Profile2D::new(&circle(3.0, 32), &[circle(2.0, 32)]).unwrap();
        let layers = [Layer::new(0.0, 1.0, 1.6), Layer::flat(1.0)];
        assert!(loft(&profile, &layers).is_err());
    }
}
