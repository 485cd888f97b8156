// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boolean subtraction with a validated fallback

use super::analytics::signed_volume;
use super::csg::csg_difference;
use super::mesh_utils::validate_mesh;
use super::Mesh;
use crate::error::{FastenerError, Result};
use tracing::{debug, warn};

/// Outcome of a subtraction. When the boolean kernel fails, `mesh` is the
/// unmodified base and `warning` says why.
#[derive(Debug, Clone)]
pub struct Subtraction {
    pub mesh: Mesh,
    pub warning: Option<FastenerError>,
}

impl Subtraction {
    /// True when the tool was actually carved out of the base
    pub fn is_carved(&self) -> bool {
        self.warning.is_none()
    }
}

/// Compute `base - tool`. Never fails: any kernel error or invalid result
/// falls back to `base` together with a `GeometryDegenerate` warning.
pub fn subtract(base: &Mesh, tool: &Mesh) -> Subtraction {
    match try_subtract(base, tool) {
        Ok(mesh) => Subtraction { mesh, warning: None },
        Err(err) => {
            warn!(error = %err, "boolean subtraction failed, keeping the base solid");
            Subtraction {
                mesh: base.clone(),
                warning: Some(err),
            }
        }
    }
}

fn try_subtract(base: &Mesh, tool: &Mesh) -> Result<Mesh> {
    if base.is_empty() {
        return Err(FastenerError::degenerate("subtract", "base solid is empty"));
    }
    if tool.is_empty() {
        return Err(FastenerError::degenerate("subtract", "tool solid is empty"));
    }
    if !base.bounding_box().intersects(&tool.bounding_box()) {
        debug!("subtraction tool misses the base");
        return Ok(base.clone());
    }

    let result = csg_difference(base, tool)?;

    let validation = validate_mesh(&result);
    if !validation.is_closed || !validation.has_consistent_winding {
        return Err(FastenerError::degenerate(
            "subtract",
            format!(
                "result is not a closed solid ({} boundary edges, {} overshared edges)",
                validation.boundary_edge_count, validation.overshared_edge_count
            ),
        ));
    }

    let base_volume = signed_volume(base);
    let volume = signed_volume(&result);
    if volume <= 0.0 || volume > base_volume * (1.0 + 1e-9) {
        return Err(FastenerError::degenerate(
            "subtract",
            format!("result volume {:.4} is inconsistent with base volume {:.4}", volume, base_volume),
        ));
    }

    debug!(
        triangles = result.triangle_count(),
        removed_volume = base_volume - volume,
        "subtraction complete"
    );
    Ok(result)
}
