// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Rotational primitives: shaft cylinders, tip cones and thread tori.
//!
//! All primitives are built around the +Z axis starting at z = 0. Circular
//! caps are fanned from rim vertex 0 without a center vertex, so two
//! primitives with the same radius and segment count touching cap to cap
//! produce exactly coincident, opposite-facing cap triangles that the merge
//! step cancels.

use super::{Mesh, Triangle};
use nalgebra::Point3;
use std::f64::consts::PI;

/// Geometric primitives
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Cylinder { h: f64, r: f64, segments: u32 },
    /// Cone with its base on z = 0 and apex at z = h
    Cone { h: f64, r: f64, segments: u32 },
    /// Torus in the XY plane; `radial` segments around the tube
    Torus {
        major: f64,
        minor: f64,
        radial: u32,
        tubular: u32,
    },
}

fn clamp_segments(segments: u32, minimum: u32) -> u32 {
    segments.max(minimum)
}

impl Primitive {
    pub fn cylinder(h: f64, r: f64, segments: u32) -> Self {
        Self::Cylinder {
            h,
            r,
            segments: clamp_segments(segments, 3),
        }
    }

    pub fn cone(h: f64, r: f64, segments: u32) -> Self {
        Self::Cone {
            h,
            r,
            segments: clamp_segments(segments, 3),
        }
    }

    pub fn torus(major: f64, minor: f64, radial: u32, tubular: u32) -> Self {
        Self::Torus {
            major,
            minor,
            radial: clamp_segments(radial, 3),
            tubular: clamp_segments(tubular, 3),
        }
    }

    pub fn to_mesh(&self) -> Mesh {
        match *self {
            Self::Cylinder { h, r, segments } => generate_cylinder_mesh(h, r, segments as usize),
            Self::Cone { h, r, segments } => generate_cone_mesh(h, r, segments as usize),
            Self::Torus {
                major,
                minor,
                radial,
                tubular,
            } => generate_torus_mesh(major, minor, radial as usize, tubular as usize),
        }
    }
}

fn push_ring(mesh: &mut Mesh, radius: f64, z: f64, segments: usize) -> usize {
    let start = mesh.vertex_count();
    for i in 0..segments {
        let theta = 2.0 * PI * i as f64 / segments as f64;
        mesh.add_point(Point3::new(radius * theta.cos(), radius * theta.sin(), z));
    }
    start
}

/// Fan a ring from its first vertex; `upward` selects +Z facing
fn fan_cap(mesh: &mut Mesh, ring: usize, segments: usize, upward: bool) {
    for i in 1..segments - 1 {
        let (a, b) = (ring + i, ring + i + 1);
        if upward {
            mesh.add_triangle(Triangle::new([ring, a, b]));
        } else {
            mesh.add_triangle(Triangle::new([ring, b, a]));
        }
    }
}

fn generate_cylinder_mesh(height: f64, radius: f64, segments: usize) -> Mesh {
    let mut mesh = Mesh::with_capacity(segments * 2, segments * 4);

    let bottom = push_ring(&mut mesh, radius, 0.0, segments);
    let top = push_ring(&mut mesh, radius, height, segments);

    for i in 0..segments {
        let next = (i + 1) % segments;
        mesh.add_triangle(Triangle::new([bottom + i, bottom + next, top + next]));
        mesh.add_triangle(Triangle::new([bottom + i, top + next, top + i]));
    }

    fan_cap(&mut mesh, bottom, segments, false);
    fan_cap(&mut mesh, top, segments, true);

    mesh.recompute_normals();
    mesh
}

fn generate_cone_mesh(height: f64, radius: f64, segments: usize) -> Mesh {
    let mut mesh = Mesh::with_capacity(segments + 1, segments * 2);

    let base = push_ring(&mut mesh, radius, 0.0, segments);
    let apex = mesh.add_point(Point3::new(0.0, 0.0, height));

    for i in 0..segments {
        let next = (i + 1) % segments;
        mesh.add_triangle(Triangle::new([base + i, base + next, apex]));
    }

    fan_cap(&mut mesh, base, segments, false);

    mesh.recompute_normals();
    mesh
}

/// Tube vertices sit at half-step angles, so no vertex lies on the torus'
/// equator or on its innermost and outermost circles.
fn generate_torus_mesh(major: f64, minor: f64, radial: usize, tubular: usize) -> Mesh {
    let radial = radial + radial % 2;
    let mut mesh = Mesh::with_capacity(radial * tubular, radial * tubular * 2);

    for j in 0..tubular {
        let u = 2.0 * PI * j as f64 / tubular as f64;
        for i in 0..radial {
            let v = 2.0 * PI * (i as f64 + 0.5) / radial as f64;
            let ring_radius = major + minor * v.cos();
            mesh.add_point(Point3::new(
                ring_radius * u.cos(),
                ring_radius * u.sin(),
                minor * v.sin(),
            ));
        }
    }

    let index = |j: usize, i: usize| (j % tubular) * radial + (i % radial);
    for j in 0..tubular {
        for i in 0..radial {
            let a = index(j, i);
            let b = index(j + 1, i);
            let c = index(j + 1, i + 1);
            let d = index(j, i + 1);
            mesh.add_triangle(Triangle::new([a, b, c]));
            mesh.add_triangle(Triangle::new([a, c, d]));
        }
    }

    mesh.recompute_normals();
    mesh
}
