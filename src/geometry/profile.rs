// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Closed 2D outlines for heads, sockets and bored bodies

use crate::error::{FastenerError, Result};
use crate::params::{HeadShape, SocketShape, SOCKET_RADIUS_RATIO};
use crate::utils::math::{point_in_polygon, segments_cross, signed_area};
use nalgebra::Point2;
use std::f64::consts::PI;

/// Default number of segments for circular outlines
pub const DEFAULT_CIRCLE_SEGMENTS: u32 = 64;
/// Circles are never approximated more coarsely than this
pub const MIN_CIRCLE_SEGMENTS: u32 = 32;

const MIN_AREA: f64 = 1e-12;

/// Outer boundary plus holes. The outer loop is counter-clockwise and every
/// hole is clockwise, strictly inside the outer loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile2D {
    outer: Vec<Point2<f64>>,
    holes: Vec<Vec<Point2<f64>>>,
}

/// Drop consecutive duplicates, including a closing point equal to the first
fn dedup_loop(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut cleaned: Vec<Point2<f64>> = Vec::with_capacity(points.len());
    for point in points {
        if cleaned.last().map_or(true, |last| (last - point).norm() > 1e-9) {
            cleaned.push(*point);
        }
    }
    while cleaned.len() > 1 && (cleaned[0] - cleaned[cleaned.len() - 1]).norm() <= 1e-9 {
        cleaned.pop();
    }
    cleaned
}

fn is_simple(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    for i in 0..n {
        let (a, b) = (&points[i], &points[(i + 1) % n]);
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (c, d) = (&points[j], &points[(j + 1) % n]);
            if segments_cross(a, b, c, d) {
                return false;
            }
        }
    }
    true
}

fn normalized_loop(points: &[Point2<f64>], counter_clockwise: bool, what: &str) -> Result<Vec<Point2<f64>>> {
    let mut cleaned = dedup_loop(points);
    if cleaned.len() < 3 {
        return Err(FastenerError::degenerate(
            "profile",
            format!("{} has {} distinct points", what, cleaned.len()),
        ));
    }
    let area = signed_area(&cleaned);
    if area.abs() < MIN_AREA || !area.is_finite() {
        return Err(FastenerError::degenerate("profile", format!("{} has zero area", what)));
    }
    if !is_simple(&cleaned) {
        return Err(FastenerError::degenerate("profile", format!("{} self-intersects", what)));
    }
    if (area > 0.0) != counter_clockwise {
        cleaned.reverse();
    }
    Ok(cleaned)
}

impl Profile2D {
    /// Build a profile, normalizing winding and validating the invariants
    pub fn new(outer: &[Point2<f64>], holes: &[Vec<Point2<f64>>]) -> Result<Self> {
        let outer = normalized_loop(outer, true, "outer boundary")?;
        let mut normalized_holes = Vec::with_capacity(holes.len());

        for hole in holes {
            let hole = normalized_loop(hole, false, "hole")?;
            if !hole.iter().all(|p| point_in_polygon(p, &outer)) {
                return Err(FastenerError::degenerate(
                    "profile",
                    "hole is not strictly inside the outer boundary",
                ));
            }
            for (i, a) in hole.iter().enumerate() {
                let b = &hole[(i + 1) % hole.len()];
                for (j, c) in outer.iter().enumerate() {
                    let d = &outer[(j + 1) % outer.len()];
                    if segments_cross(a, b, c, d) {
                        return Err(FastenerError::degenerate(
                            "profile",
                            "hole crosses the outer boundary",
                        ));
                    }
                }
            }
            normalized_holes.push(hole);
        }

        Ok(Self {
            outer,
            holes: normalized_holes,
        })
    }

    pub fn polygon(outer: &[Point2<f64>]) -> Result<Self> {
        Self::new(outer, &[])
    }

    /// Same outer boundary with one more hole
    pub fn with_hole(&self, hole: &[Point2<f64>]) -> Result<Self> {
        let mut holes = self.holes.clone();
        holes.push(hole.to_vec());
        Self::new(&self.outer, &holes)
    }

    /// Copy without holes, used when a bored body cannot be built
    pub fn without_holes(&self) -> Self {
        Self {
            outer: self.outer.clone(),
            holes: Vec::new(),
        }
    }

    pub fn outer(&self) -> &[Point2<f64>] {
        &self.outer
    }

    pub fn holes(&self) -> &[Vec<Point2<f64>>] {
        &self.holes
    }

    /// Outer loop followed by every hole
    pub fn contours(&self) -> impl Iterator<Item = &[Point2<f64>]> {
        std::iter::once(self.outer.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
    }

    pub fn point_count(&self) -> usize {
        self.contours().map(<[_]>::len).sum()
    }

    /// Material area (outer minus holes)
    pub fn area(&self) -> f64 {
        self.contours().map(signed_area).sum()
    }

    /// Largest distance from the origin to any outer point
    pub fn max_radius(&self) -> f64 {
        self.outer.iter().map(|p| p.coords.norm()).fold(0.0, f64::max)
    }

    /// Scale the outer loop and the holes independently about the origin
    pub fn scaled(&self, outer_scale: f64, hole_scale: f64) -> Result<Self> {
        let outer: Vec<_> = self.outer.iter().map(|p| p * outer_scale).collect();
        let holes: Vec<Vec<_>> = self
            .holes
            .iter()
            .map(|hole| hole.iter().map(|p| p * hole_scale).collect())
            .collect();
        Self::new(&outer, &holes)
    }
}

/// Regular polygon circumscribed at `radius`, first vertex at `start_degrees`
pub fn regular_polygon(sides: usize, radius: f64, start_degrees: f64) -> Vec<Point2<f64>> {
    (0..sides)
        .map(|i| {
            let angle = (start_degrees + i as f64 * 360.0 / sides as f64).to_radians();
            Point2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// Circle approximation starting at angle 0
pub fn circle(radius: f64, segments: u32) -> Vec<Point2<f64>> {
    let segments = segments.max(MIN_CIRCLE_SEGMENTS) as usize;
    (0..segments)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / segments as f64;
            Point2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// Head outline at the top face; `size` is across corners or the diameter
pub fn head_outline(shape: HeadShape, size: f64, segments: u32) -> Vec<Point2<f64>> {
    let radius = size / 2.0;
    match shape {
        HeadShape::Hex => regular_polygon(6, radius, 30.0),
        HeadShape::Square => regular_polygon(4, radius, 45.0),
        HeadShape::Round | HeadShape::Button | HeadShape::Countersunk => circle(radius, segments),
    }
}

pub fn head_profile(shape: HeadShape, size: f64, segments: u32) -> Result<Profile2D> {
    if size.is_nan() || size <= 0.0 {
        return Err(FastenerError::invalid("head_size", format!("must be positive, got {}", size)));
    }
    Profile2D::polygon(&head_outline(shape, size, segments))
}

fn rectangle(width: f64, height: f64) -> Vec<Point2<f64>> {
    let (w, h) = (width / 2.0, height / 2.0);
    vec![
        Point2::new(-w, -h),
        Point2::new(w, -h),
        Point2::new(w, h),
        Point2::new(-w, h),
    ]
}

/// Twelve-vertex plus sign made of two crossed bars
fn cross_outline(span: f64, bar: f64) -> Vec<Point2<f64>> {
    let (s, c) = (span / 2.0, bar / 2.0);
    vec![
        Point2::new(-c, -s),
        Point2::new(c, -s),
        Point2::new(c, -c),
        Point2::new(s, -c),
        Point2::new(s, c),
        Point2::new(c, c),
        Point2::new(c, s),
        Point2::new(-c, s),
        Point2::new(-c, c),
        Point2::new(-s, c),
        Point2::new(-s, -c),
        Point2::new(-c, -c),
    ]
}

/// Drive recess outline for a head of the given size; `None` for no socket
pub fn socket_profile(shape: SocketShape, head_size: f64) -> Result<Option<Profile2D>> {
    let head_radius = head_size / 2.0;
    let socket_radius = head_radius * SOCKET_RADIUS_RATIO;

    let outline = match shape {
        SocketShape::None => return Ok(None),
        SocketShape::Hex => regular_polygon(6, socket_radius, 30.0),
        SocketShape::Torx => (0..12)
            .map(|i| {
                let angle = (i as f64 * 30.0).to_radians();
                let r = if i % 2 == 0 { socket_radius } else { socket_radius * 0.7 };
                Point2::new(r * angle.cos(), r * angle.sin())
            })
            .collect(),
        SocketShape::Slot => rectangle(head_radius * 1.4, head_radius * 0.2),
        SocketShape::Phillips => cross_outline(head_radius * 1.6, head_radius * 0.35),
    };

    Profile2D::polygon(&outline).map(Some)
}
