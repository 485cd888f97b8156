// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batch layout: places kits on a square-ish grid and re-centers the batch

use crate::config::MeshQuality;
use crate::error::{FastenerError, Result};
use crate::geometry::BoundingBox;
use crate::params::{Dimensions, FastenerParams};
use crate::parts::{assemble_kit, Part};
use nalgebra::Vector3;
use parry3d::bounding_volume::{Aabb, BoundingVolume};
use parry3d::math::Point;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Smallest slot width, in millimeters
pub const BASE_SPACING: f64 = 10.0;
/// Gap kept between neighboring parts
pub const MIN_CLEARANCE: f64 = 2.0;

/// Grid shape for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    pub columns: usize,
    pub rows: usize,
}

impl GridSpec {
    /// `columns = ceil(sqrt(quantity))`, `rows = ceil(quantity / columns)`
    pub fn for_quantity(quantity: usize) -> Self {
        let quantity = quantity.max(1);
        let mut columns = (quantity as f64).sqrt().floor() as usize;
        while columns * columns < quantity {
            columns += 1;
        }
        Self {
            columns,
            rows: quantity.div_ceil(columns),
        }
    }

    /// `(row, column)` of the kit at `index`
    pub fn cell(&self, index: usize) -> (usize, usize) {
        (index / self.columns, index % self.columns)
    }
}

/// Slot width: wide enough that the largest part never reaches its neighbor
pub fn slot_width(max_radius: f64) -> f64 {
    BASE_SPACING.max(2.0 * max_radius + MIN_CLEARANCE)
}

/// Every placed part of a batch
#[derive(Debug, Clone)]
pub struct KitLayout {
    pub parts: Vec<Part>,
    pub grid: GridSpec,
    pub slot: f64,
    pub quantity: usize,
    /// Fingerprint of the parameters the batch was built from
    pub fingerprint: String,
}

impl KitLayout {
    /// Parts belonging to kit `kit_index` (1-based)
    pub fn kit(&self, kit_index: usize) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(move |part| part.kit_index == kit_index)
    }

    /// World bounds of the whole batch
    pub fn bounds(&self) -> BoundingBox {
        self.parts
            .iter()
            .fold(BoundingBox::empty(), |acc, part| acc.union(&part.world_bounds()))
    }

    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(Part::triangle_count).sum()
    }

    /// Warnings from every part, labelled with the part name
    pub fn warnings(&self) -> Vec<(String, &FastenerError)> {
        self.parts
            .iter()
            .flat_map(|part| part.warnings.iter().map(move |w| (part.name(), w)))
            .collect()
    }

    /// Fail if the world boxes of any two parts overlap
    pub fn verify_clearance(&self) -> Result<()> {
        let boxes: Vec<Aabb> = self.parts.iter().map(|part| to_aabb(&part.world_bounds())).collect();

        for (i, a) in boxes.iter().enumerate() {
            for (j, b) in boxes.iter().enumerate().skip(i + 1) {
                if a.intersects(b) {
                    return Err(FastenerError::Layout {
                        details: format!(
                            "{} overlaps {}",
                            self.parts[i].name(),
                            self.parts[j].name()
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    fn recenter(&mut self) -> Vector3<f64> {
        let bounds = self.bounds();
        if bounds.is_empty() {
            return Vector3::zeros();
        }
        let shift = -bounds.center().coords;
        for part in &mut self.parts {
            part.offset += shift;
        }
        shift
    }
}

fn to_aabb(bbox: &BoundingBox) -> Aabb {
    Aabb::new(
        Point::new(bbox.min.x as f32, bbox.min.y as f32, bbox.min.z as f32),
        Point::new(bbox.max.x as f32, bbox.max.y as f32, bbox.max.z as f32),
    )
}

/// Assemble `params.quantity` kits and place them on the grid.
///
/// Kits are identical, so one kit is assembled and copied into every cell.
pub fn layout(params: &FastenerParams, quality: &MeshQuality) -> Result<KitLayout> {
    let template = assemble_kit(params, quality, 1)?;
    let dims = Dimensions::derive(params);

    let quantity = params.quantity as usize;
    let grid = GridSpec::for_quantity(quantity);
    let slot = slot_width(dims.max_part_radius(params));
    let kit_pitch_x = 3.0 * slot;
    let kit_pitch_y = 2.0 * slot;

    let mut parts = Vec::with_capacity(quantity * template.len());
    for index in 0..quantity {
        let (row, column) = grid.cell(index);
        let origin = Vector3::new(column as f64 * kit_pitch_x, row as f64 * kit_pitch_y, 0.0);
        for part in &template {
            let offset = origin + Vector3::new(part.kind.slot_position() as f64 * slot, 0.0, 0.0);
            parts.push(part.placed(index + 1, offset));
        }
    }

    let mut batch = KitLayout {
        parts,
        grid,
        slot,
        quantity,
        fingerprint: params.fingerprint(),
    };
    let shift = batch.recenter();
    batch.verify_clearance()?;

    debug!(?shift, slot, "batch re-centered");
    info!(
        kits = quantity,
        columns = grid.columns,
        rows = grid.rows,
        parts = batch.parts.len(),
        "batch laid out"
    );
    Ok(batch)
}
