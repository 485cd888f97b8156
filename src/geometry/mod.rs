// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation and solid construction

pub mod analytics;
mod bbox;
pub mod boolean;
mod csg;
pub mod extrude;
pub mod mesh;
pub mod mesh_utils;
mod primitives;
pub mod profile;
pub mod triangulate;

pub use analytics::{analyze, GeometryStats};
pub use bbox::BoundingBox;
pub use boolean::{subtract, Subtraction};
pub use extrude::{extrude, loft, Layer};
pub use mesh::{Mesh, Triangle, Vertex};
pub use primitives::Primitive;
pub use profile::{head_profile, socket_profile, Profile2D};
