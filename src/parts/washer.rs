// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Flat washer

use super::{Part, PartKind};
use crate::config::MeshQuality;
use crate::error::Result;
use crate::geometry::profile::circle;
use crate::geometry::{extrude, Profile2D};
use crate::params::{Dimensions, FastenerParams};
use tracing::{debug, warn};

pub fn build_washer(
    params: &FastenerParams,
    dims: &Dimensions,
    quality: &MeshQuality,
    kit_index: usize,
) -> Result<Part> {
    let mut warnings = Vec::new();
    let outer = circle(dims.washer_outer_radius, quality.circle_segments);
    let bore = circle(dims.washer_inner_radius, quality.circle_segments);

    let annulus = Profile2D::new(&outer, &[bore]).and_then(|profile| extrude(&profile, params.washer_thickness));
    let body = match annulus {
        Ok(mesh) => mesh,
        Err(err) => {
            warn!(error = %err, "washer bore failed, building a solid disc");
            warnings.push(err);
            extrude(&Profile2D::polygon(&outer)?, params.washer_thickness)?
        }
    };

    debug!(kit = kit_index, triangles = body.triangle_count(), "washer built");
    Ok(Part::new(PartKind::Washer, kit_index, vec![body], warnings))
}
