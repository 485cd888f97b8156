// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bolt assembly.
//!
//! The head's top face sits on z = 0 and the bolt grows along +Z: head,
//! shaft, then the optional tip. Thread rings start at the underside of the
//! head.

use super::threads::{generate_threads, ThreadSpec};
use super::{Part, PartKind};
use crate::config::MeshQuality;
use crate::error::{FastenerError, Result};
use crate::geometry::{extrude, head_profile, loft, socket_profile, subtract, Layer, Mesh, Primitive};
use crate::params::{Dimensions, FastenerParams, SocketDims, TipShape};
use nalgebra::Vector3;
use tracing::{debug, warn};

/// Socket tools start this far above the head face so no faces are coplanar
pub const SOCKET_LEAD: f64 = 0.01;

pub fn build_bolt(
    params: &FastenerParams,
    dims: &Dimensions,
    quality: &MeshQuality,
    kit_index: usize,
) -> Result<Part> {
    let mut warnings = Vec::new();

    let mut head = build_head(params, quality)?;
    if let Some(socket) = &dims.socket {
        match socket_tool(params, socket) {
            Ok(Some(tool)) => {
                let carved = subtract(&head, &tool);
                if let Some(warning) = carved.warning {
                    warnings.push(warning);
                }
                head = carved.mesh;
            }
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, "socket tool could not be built, head left uncarved");
                warnings.push(err);
            }
        }
    }

    let shaft = Primitive::cylinder(params.length, dims.shaft_radius, quality.shaft_segments)
        .to_mesh()
        .translated(&Vector3::new(0.0, 0.0, params.head_height));

    let mut solids = vec![head, shaft];
    solids.extend(generate_threads(&ThreadSpec::external(params, dims, quality)));
    if let Some(tip) = build_tip(params, dims, quality) {
        solids.push(tip);
    }

    debug!(kit = kit_index, solids = solids.len(), warnings = warnings.len(), "bolt built");
    Ok(Part::new(PartKind::Bolt, kit_index, solids, warnings))
}

/// Prism for flat heads, frustum narrowing toward the shaft for countersunk
fn build_head(params: &FastenerParams, quality: &MeshQuality) -> Result<Mesh> {
    let profile = head_profile(params.head_shape, params.head_size, quality.circle_segments)?;
    let layers = [
        Layer::flat(0.0),
        Layer::new(params.head_height, params.head_shape.bottom_scale(), 1.0),
    ];
    loft(&profile, &layers)
}

fn socket_tool(params: &FastenerParams, socket: &SocketDims) -> Result<Option<Mesh>> {
    let Some(profile) = socket_profile(socket.shape, params.head_size)? else {
        return Ok(None);
    };
    if socket.depth <= 0.0 {
        return Err(FastenerError::degenerate("socket", "socket depth is zero"));
    }
    let tool = extrude(&profile, socket.depth + SOCKET_LEAD)?;
    Ok(Some(tool.translated(&Vector3::new(0.0, 0.0, -SOCKET_LEAD))))
}

fn build_tip(params: &FastenerParams, dims: &Dimensions, quality: &MeshQuality) -> Option<Mesh> {
    let primitive = match params.tip_shape {
        TipShape::Flat => return None,
        TipShape::Pointed => Primitive::cone(params.tip_length, dims.tip_radius, quality.shaft_segments),
        TipShape::DogPoint => Primitive::cylinder(params.tip_length, dims.tip_radius, quality.shaft_segments),
    };
    let end = params.head_height + params.length;
    Some(primitive.to_mesh().translated(&Vector3::new(0.0, 0.0, end)))
}
