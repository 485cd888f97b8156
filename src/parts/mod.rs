// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Part assemblers: bolt, nut and washer built from profiles, solids and
//! thread rings

pub mod bolt;
pub mod nut;
pub mod threads;
pub mod washer;

use crate::config::MeshQuality;
use crate::error::{FastenerError, Result};
use crate::geometry::{BoundingBox, Mesh};
use crate::params::{Dimensions, FastenerParams};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use bolt::build_bolt;
pub use nut::build_nut;
pub use threads::{generate_threads, ThreadSpec};
pub use washer::build_washer;

/// Kind of physical part in a kit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    Bolt,
    Nut,
    Washer,
}

impl PartKind {
    /// Lowercase stem used for package file names
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bolt => "bolt",
            Self::Nut => "nut",
            Self::Washer => "washer",
        }
    }

    /// Capitalized name used for scene objects
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Bolt => "Bolt",
            Self::Nut => "Nut",
            Self::Washer => "Washer",
        }
    }

    /// Fixed slot within a kit row; a washer keeps its slot when there is no nut
    pub fn slot_position(&self) -> usize {
        match self {
            Self::Bolt => 0,
            Self::Nut => 1,
            Self::Washer => 2,
        }
    }
}

impl std::fmt::Display for PartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One physical part: its solids in local coordinates plus a placement
#[derive(Debug, Clone)]
pub struct Part {
    pub kind: PartKind,
    /// 1-based kit number
    pub kit_index: usize,
    pub solids: Vec<Mesh>,
    pub offset: Vector3<f64>,
    /// Recovered geometry failures raised while building the part
    pub warnings: Vec<FastenerError>,
}

impl Part {
    pub fn new(kind: PartKind, kit_index: usize, solids: Vec<Mesh>, warnings: Vec<FastenerError>) -> Self {
        Self {
            kind,
            kit_index,
            solids,
            offset: Vector3::zeros(),
            warnings,
        }
    }

    /// `Bolt_1`, `Nut_3`, ...
    pub fn name(&self) -> String {
        format!("{}_{}", self.kind.display_name(), self.kit_index)
    }

    /// `bolt_1`, `nut_3`, ...
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.kind.label(), self.kit_index)
    }

    /// Copy of this part for another kit at another position
    pub fn placed(&self, kit_index: usize, offset: Vector3<f64>) -> Self {
        Self {
            kit_index,
            offset,
            ..self.clone()
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.solids.iter().map(Mesh::triangle_count).sum()
    }

    pub fn local_bounds(&self) -> BoundingBox {
        self.solids
            .iter()
            .fold(BoundingBox::empty(), |acc, solid| acc.union(&solid.bounding_box()))
    }

    pub fn world_bounds(&self) -> BoundingBox {
        self.local_bounds().translated(&self.offset)
    }
}

/// Build the parts of one kit, in bolt, nut, washer order
pub fn assemble_kit(params: &FastenerParams, quality: &MeshQuality, kit_index: usize) -> Result<Vec<Part>> {
    params.validate()?;
    let dims = Dimensions::derive(params);
    let quality = quality.clamped();

    let mut parts = vec![build_bolt(params, &dims, &quality, kit_index)?];
    if params.has_nut {
        parts.push(build_nut(params, &dims, &quality, kit_index)?);
    }
    if params.has_washer {
        parts.push(build_washer(params, &dims, &quality, kit_index)?);
    }

    debug!(
        kit = kit_index,
        parts = parts.len(),
        triangles = parts.iter().map(Part::triangle_count).sum::<usize>(),
        "kit assembled"
    );
    Ok(parts)
}
