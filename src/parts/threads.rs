// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Discrete thread rings approximating a helix

use crate::config::MeshQuality;
use crate::geometry::{Mesh, Primitive};
use crate::params::{ring_count, Dimensions, FastenerParams};
use nalgebra::Vector3;
use tracing::debug;

/// Placement of a run of thread rings along the Z axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreadSpec {
    pub axis_start: f64,
    pub length: f64,
    pub pitch: f64,
    /// Distance from the axis to the ring's tube center
    pub major_radius: f64,
    /// Tube radius, half the thread depth
    pub minor_radius: f64,
    /// Offset of the first ring from `axis_start`
    pub phase: f64,
    pub minor_segments: u32,
    pub major_segments: u32,
}

impl ThreadSpec {
    /// Rings on a bolt shaft starting at the underside of the head
    pub fn external(params: &FastenerParams, dims: &Dimensions, quality: &MeshQuality) -> Self {
        Self {
            axis_start: params.head_height,
            length: params.length,
            pitch: params.pitch,
            major_radius: dims.thread_major_radius,
            minor_radius: dims.thread_minor_radius,
            phase: 0.0,
            minor_segments: quality.ring_minor_segments,
            major_segments: quality.ring_major_segments,
        }
    }

    /// Rings inside a nut bore, offset half a pitch from the face
    pub fn internal(params: &FastenerParams, dims: &Dimensions, quality: &MeshQuality) -> Self {
        Self {
            axis_start: 0.0,
            length: params.nut_height,
            pitch: params.pitch,
            major_radius: dims.nut_thread_radius,
            minor_radius: dims.thread_minor_radius,
            phase: params.pitch / 2.0,
            minor_segments: quality.ring_minor_segments,
            major_segments: quality.ring_major_segments,
        }
    }

    pub fn ring_count(&self) -> usize {
        ring_count(self.length, self.pitch)
    }

    /// Z of every ring center
    pub fn ring_positions(&self) -> Vec<f64> {
        (0..self.ring_count())
            .map(|i| self.axis_start + self.phase + i as f64 * self.pitch)
            .collect()
    }
}

/// One closed torus per ring. Empty when the length is shorter than a pitch.
pub fn generate_threads(spec: &ThreadSpec) -> Vec<Mesh> {
    if spec.minor_radius <= 0.0 || spec.major_radius <= spec.minor_radius {
        debug!(?spec, "thread rings skipped");
        return Vec::new();
    }

    let ring = Primitive::torus(
        spec.major_radius,
        spec.minor_radius,
        spec.minor_segments,
        spec.major_segments,
    )
    .to_mesh();

    let rings: Vec<Mesh> = spec
        .ring_positions()
        .into_iter()
        .map(|z| ring.clone().translated(&Vector3::new(0.0, 0.0, z)))
        .collect();

    debug!(rings = rings.len(), pitch = spec.pitch, "thread rings generated");
    rings
}
