// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boltforge
//!
//! Parametric generator for 3D-printable fastener kits. A bolt, an optional
//! matching nut and an optional washer are built from a handful of
//! parameters, compensated for the printer's nozzle size, laid out as a batch
//! and exported as an STL package, a 3MF package or a glTF scene.

pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod layout;
pub mod params;
pub mod parts;
pub mod tolerance;
pub mod utils;

pub use config::{KitConfig, MeshQuality, QualityPreset};
pub use error::{FastenerError, Result};
pub use geometry::{Mesh, Primitive};
pub use io::{export, ExportFormat};
pub use layout::{layout, GridSpec, KitLayout};
pub use params::{Dimensions, FastenerParams, HeadShape, SocketShape, TipShape};
pub use parts::{Part, PartKind};
pub use tolerance::PrintTolerance;

/// Build and lay out a complete batch
pub fn generate(params: &FastenerParams, quality: &MeshQuality) -> Result<KitLayout> {
    layout(params, quality)
}

/// Build a batch and encode it in one step
pub fn generate_package(params: &FastenerParams, quality: &MeshQuality, format: ExportFormat) -> Result<Vec<u8>> {
    let batch = generate(params, quality)?;
    export(&batch, format)
}
