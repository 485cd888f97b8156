// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Fastener parameter model and derived dimensions

use crate::error::{FastenerError, Result};
use crate::tolerance::{self, PrintTolerance};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Socket outline radius as a fraction of the head radius
pub const SOCKET_RADIUS_RATIO: f64 = 0.6;
/// Dog point tip radius as a fraction of the shaft radius
pub const DOG_POINT_RATIO: f64 = 0.7;
/// Countersunk head radius at the shaft side, relative to the top face
pub const COUNTERSUNK_TOP_RATIO: f64 = 0.6;
/// Washer bore clearance; fixed, not taken from the nozzle table
pub const WASHER_BORE_CLEARANCE: f64 = 0.3;

/// Outer shape of a bolt head (and of the matching nut body)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadShape {
    Hex,
    Square,
    Round,
    Button,
    Countersunk,
}

impl HeadShape {
    /// Scale of the head outline at the shaft side relative to the top face
    pub fn bottom_scale(&self) -> f64 {
        match self {
            Self::Countersunk => COUNTERSUNK_TOP_RATIO,
            _ => 1.0,
        }
    }
}

/// Drive recess carved into the head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocketShape {
    None,
    Hex,
    Torx,
    Phillips,
    Slot,
}

/// End of the shaft opposite the head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipShape {
    Flat,
    Pointed,
    DogPoint,
}

/// Complete description of one fastener kit. All lengths in millimeters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FastenerParams {
    /// Nominal thread diameter
    pub d: f64,
    pub pitch: f64,
    /// Head width across corners (polygon heads) or diameter (round heads)
    pub head_size: f64,
    pub head_height: f64,
    /// Shaft length below the head
    pub length: f64,
    /// Radial thread depth
    pub thread_depth: f64,
    pub head_shape: HeadShape,
    pub socket_shape: SocketShape,
    /// Socket depth as a fraction of the head height, in [0, 1)
    pub socket_depth_fraction: f64,
    pub tip_shape: TipShape,
    /// Only used when `tip_shape` is not `Flat`
    pub tip_length: f64,
    pub nozzle_size: f64,
    pub quantity: u32,
    pub has_nut: bool,
    pub nut_height: f64,
    pub has_washer: bool,
    pub washer_thickness: f64,
    pub washer_outer_diameter: f64,
}

impl Default for FastenerParams {
    fn default() -> Self {
        Self {
            d: 4.0,
            pitch: 0.7,
            head_size: 7.0,
            head_height: 3.0,
            length: 20.0,
            thread_depth: 0.35,
            head_shape: HeadShape::Round,
            socket_shape: SocketShape::Hex,
            socket_depth_fraction: 0.7,
            tip_shape: TipShape::Flat,
            tip_length: 5.0,
            nozzle_size: 0.4,
            quantity: 1,
            has_nut: false,
            nut_height: 3.2,
            has_washer: false,
            washer_thickness: 1.0,
            washer_outer_diameter: 9.0,
        }
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FastenerError::invalid(
            field,
            format!("must be a positive length, got {}", value),
        ))
    }
}

impl FastenerParams {
    /// Check the data model invariants
    pub fn validate(&self) -> Result<()> {
        require_positive("d", self.d)?;
        require_positive("pitch", self.pitch)?;
        require_positive("head_size", self.head_size)?;
        require_positive("head_height", self.head_height)?;
        require_positive("length", self.length)?;
        require_positive("thread_depth", self.thread_depth)?;
        require_positive("nozzle_size", self.nozzle_size)?;

        if self.tip_shape != TipShape::Flat {
            require_positive("tip_length", self.tip_length)?;
        }
        if self.has_nut {
            require_positive("nut_height", self.nut_height)?;
        }
        if self.has_washer {
            require_positive("washer_thickness", self.washer_thickness)?;
            require_positive("washer_outer_diameter", self.washer_outer_diameter)?;
            if self.washer_outer_diameter <= self.d {
                return Err(FastenerError::invalid(
                    "washer_outer_diameter",
                    format!(
                        "must exceed the nominal diameter {} (got {})",
                        self.d, self.washer_outer_diameter
                    ),
                ));
            }
        }

        if !(0.0..1.0).contains(&self.socket_depth_fraction) {
            return Err(FastenerError::invalid(
                "socket_depth_fraction",
                format!(
                    "must be in [0, 1) so the socket never pierces the head, got {}",
                    self.socket_depth_fraction
                ),
            ));
        }

        if self.quantity == 0 {
            return Err(FastenerError::invalid("quantity", "must be at least 1"));
        }

        if self.thread_depth >= self.d / 2.0 {
            return Err(FastenerError::invalid(
                "thread_depth",
                format!("must be smaller than the radius {}", self.d / 2.0),
            ));
        }

        let dims = Dimensions::derive(self);
        if dims.shaft_radius <= 0.0 {
            return Err(FastenerError::invalid(
                "d",
                format!(
                    "shaft radius after print offset is {:.3}; increase d or reduce thread_depth",
                    dims.shaft_radius
                ),
            ));
        }

        Ok(())
    }

    /// Socket actually carved into the head, after normalizing zero depth
    pub fn effective_socket(&self) -> SocketShape {
        if self.socket_depth_fraction <= 0.0 {
            SocketShape::None
        } else {
            self.socket_shape
        }
    }

    /// Number of physical parts in one kit
    pub fn parts_per_kit(&self) -> usize {
        1 + usize::from(self.has_nut) + usize::from(self.has_washer)
    }

    /// Total physical parts across the batch
    pub fn total_parts(&self) -> usize {
        self.quantity as usize * self.parts_per_kit()
    }

    /// Stable SHA-256 digest of the canonical JSON form, for caller-side caching
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        let digest = Sha256::digest(&canonical);
        format!("{:x}", digest)
    }
}

/// Socket recess dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SocketDims {
    pub shape: SocketShape,
    pub radius: f64,
    pub depth: f64,
}

/// Quantities derived from [`FastenerParams`]. Every consumer computes
/// dimensions through here so external generators stay consistent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub tolerance: PrintTolerance,
    pub head_radius: f64,
    /// `d/2 - thread_depth`, before print compensation
    pub nominal_shaft_radius: f64,
    /// Printed shaft radius, `nominal_shaft_radius - shaft_offset`
    pub shaft_radius: f64,
    pub thread_major_radius: f64,
    pub thread_minor_radius: f64,
    pub thread_rings: usize,
    pub socket: Option<SocketDims>,
    /// Base radius of the tip solid, zero for flat tips
    pub tip_radius: f64,
    pub bore_radius: f64,
    pub nut_thread_radius: f64,
    pub nut_thread_rings: usize,
    pub washer_inner_radius: f64,
    pub washer_outer_radius: f64,
}

/// `floor(length / pitch)`, tolerant of exact multiples lost to rounding
pub fn ring_count(length: f64, pitch: f64) -> usize {
    if pitch <= 0.0 || length <= 0.0 {
        return 0;
    }
    (length / pitch + 1e-9).floor() as usize
}

impl Dimensions {
    pub fn derive(params: &FastenerParams) -> Self {
        let tolerance = tolerance::resolve(params.nozzle_size);
        let head_radius = params.head_size / 2.0;
        let nominal_shaft_radius = params.d / 2.0 - params.thread_depth;
        let shaft_radius = nominal_shaft_radius - tolerance.shaft_offset;
        let thread_minor_radius = params.thread_depth / 2.0;

        let socket = match params.effective_socket() {
            SocketShape::None => None,
            shape => Some(SocketDims {
                shape,
                radius: head_radius * SOCKET_RADIUS_RATIO,
                depth: params.head_height * params.socket_depth_fraction,
            }),
        };

        let tip_radius = match params.tip_shape {
            TipShape::Flat => 0.0,
            TipShape::Pointed => shaft_radius,
            TipShape::DogPoint => shaft_radius * DOG_POINT_RATIO,
        };

        let bore_radius = params.d / 2.0 + tolerance.bore_clearance;

        Self {
            tolerance,
            head_radius,
            nominal_shaft_radius,
            shaft_radius,
            thread_major_radius: shaft_radius + thread_minor_radius,
            thread_minor_radius,
            thread_rings: ring_count(params.length, params.pitch),
            socket,
            tip_radius,
            bore_radius,
            nut_thread_radius: bore_radius - thread_minor_radius,
            nut_thread_rings: ring_count(params.nut_height, params.pitch),
            washer_inner_radius: params.d / 2.0 + WASHER_BORE_CLEARANCE,
            washer_outer_radius: params.washer_outer_diameter / 2.0,
        }
    }

    /// Largest XY radius of any part in a kit
    pub fn max_part_radius(&self, params: &FastenerParams) -> f64 {
        let mut radius = self.head_radius.max(self.thread_major_radius + self.thread_minor_radius);
        if params.has_nut {
            radius = radius.max(self.head_radius);
        }
        if params.has_washer {
            radius = radius.max(self.washer_outer_radius);
        }
        radius
    }
}
