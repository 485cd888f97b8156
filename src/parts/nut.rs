// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Nut assembly: bored body with chamfered faces and internal thread rings

use super::threads::{generate_threads, ThreadSpec};
use super::{Part, PartKind};
use crate::config::MeshQuality;
use crate::error::{FastenerError, Result};
use crate::geometry::profile::{circle, head_outline};
use crate::geometry::{extrude, loft, Layer, Mesh, Profile2D};
use crate::params::{Dimensions, FastenerParams};
use nalgebra::Point2;
use tracing::{debug, warn};

/// Nominal edge chamfer on both printed faces
pub const NUT_CHAMFER: f64 = 0.15;

const MIN_CHAMFER: f64 = 1e-6;

pub fn build_nut(
    params: &FastenerParams,
    dims: &Dimensions,
    quality: &MeshQuality,
    kit_index: usize,
) -> Result<Part> {
    let mut warnings = Vec::new();
    let outline = head_outline(params.head_shape, params.head_size, quality.circle_segments);
    let bore = circle(dims.bore_radius, quality.circle_segments);

    let body = match Profile2D::new(&outline, &[bore]) {
        Ok(profile) => bored_body(&profile, params, dims, &mut warnings)?,
        Err(err) => {
            warn!(error = %err, "nut bore does not fit the body, building it solid");
            warnings.push(err);
            extrude(&Profile2D::polygon(&outline)?, params.nut_height)?
        }
    };

    let mut solids = vec![body];
    solids.extend(generate_threads(&ThreadSpec::internal(params, dims, quality)));

    debug!(kit = kit_index, solids = solids.len(), warnings = warnings.len(), "nut built");
    Ok(Part::new(PartKind::Nut, kit_index, solids, warnings))
}

/// Chamfered loft, then a plain extrusion, then the body without its bore
fn bored_body(
    profile: &Profile2D,
    params: &FastenerParams,
    dims: &Dimensions,
    warnings: &mut Vec<FastenerError>,
) -> Result<Mesh> {
    let height = params.nut_height;
    let apothem = inscribed_radius(profile.outer());
    let chamfer = chamfer_size(height, apothem, dims.bore_radius);

    if chamfer > MIN_CHAMFER {
        let outer_scale = (apothem - chamfer) / apothem;
        let hole_scale = (dims.bore_radius + chamfer) / dims.bore_radius;
        let layers = [
            Layer::new(0.0, outer_scale, hole_scale),
            Layer::flat(chamfer),
            Layer::flat(height - chamfer),
            Layer::new(height, outer_scale, hole_scale),
        ];
        match loft(profile, &layers) {
            Ok(mesh) => return Ok(mesh),
            Err(err) => {
                warn!(error = %err, chamfer, "nut chamfer failed, extruding without it");
                warnings.push(err);
            }
        }
    }

    match extrude(profile, height) {
        Ok(mesh) => Ok(mesh),
        Err(err) => {
            warn!(error = %err, "bored nut body failed, building it solid");
            warnings.push(err);
            extrude(&profile.without_holes(), height)
        }
    }
}

/// Chamfer clamped to a quarter of the height and a third of the wall
pub fn chamfer_size(height: f64, apothem: f64, bore_radius: f64) -> f64 {
    let wall = apothem - bore_radius;
    if wall <= 0.0 {
        return 0.0;
    }
    NUT_CHAMFER.min(height / 4.0).min(wall / 3.0)
}

/// Distance from the origin to the nearest edge of a loop around it
fn inscribed_radius(outline: &[Point2<f64>]) -> f64 {
    let n = outline.len();
    (0..n)
        .map(|i| {
            let (a, b) = (outline[i].coords, outline[(i + 1) % n].coords);
            let edge = b - a;
            let t = (-a.dot(&edge) / edge.norm_squared()).clamp(0.0, 1.0);
            (a + edge * t).norm()
        })
        .fold(f64::INFINITY, f64::min)
}
