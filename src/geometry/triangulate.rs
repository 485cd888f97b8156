// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Ear-clipping triangulation of profiles with holes.
//!
//! Holes are bridged into the outer loop first, turning the profile into a
//! single weakly simple polygon. Indices in the output refer to the
//! profile's points in `contours()` order.

use super::profile::Profile2D;
use crate::error::{FastenerError, Result};
use crate::utils::math::{orient2d, point_in_triangle, segments_cross};
use nalgebra::Point2;

const CONVEX_EPSILON: f64 = 1e-14;

/// Triangulate a profile. Triangles are counter-clockwise seen from +Z.
pub fn triangulate(profile: &Profile2D) -> Result<Vec<[usize; 3]>> {
    let points: Vec<Point2<f64>> = profile.contours().flatten().copied().collect();

    let mut ring: Vec<usize> = (0..profile.outer().len()).collect();
    let mut hole_ranges = Vec::with_capacity(profile.holes().len());
    let mut offset = profile.outer().len();
    for hole in profile.holes() {
        hole_ranges.push(offset..offset + hole.len());
        offset += hole.len();
    }

    // Rightmost holes first, so later bridges never have to cross earlier ones
    hole_ranges.sort_by(|a, b| {
        let max_x = |range: &std::ops::Range<usize>| {
            points[range.clone()].iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max)
        };
        max_x(b).total_cmp(&max_x(a))
    });

    for (k, range) in hole_ranges.iter().enumerate() {
        let pending: Vec<_> = hole_ranges[k + 1..].to_vec();
        ring = bridge_hole(&points, ring, range.clone(), &pending)?;
    }

    ear_clip(&points, ring)
}

fn bridge_hole(
    points: &[Point2<f64>],
    ring: Vec<usize>,
    hole: std::ops::Range<usize>,
    pending: &[std::ops::Range<usize>],
) -> Result<Vec<usize>> {
    let hole_indices: Vec<usize> = hole.clone().collect();
    let (start, &m) = hole_indices
        .iter()
        .enumerate()
        .max_by(|a, b| points[*a.1].x.total_cmp(&points[*b.1].x))
        .ok_or_else(|| FastenerError::degenerate("triangulate", "empty hole"))?;
    let mp = points[m];

    let mut edges: Vec<(usize, usize)> = (0..ring.len())
        .map(|i| (ring[i], ring[(i + 1) % ring.len()]))
        .collect();
    for range in pending.iter().chain(std::iter::once(&hole)) {
        let indices: Vec<usize> = range.clone().collect();
        for i in 0..indices.len() {
            edges.push((indices[i], indices[(i + 1) % indices.len()]));
        }
    }

    let mut candidates: Vec<usize> = (0..ring.len())
        .filter(|&i| points[ring[i]].x >= mp.x)
        .collect();
    candidates.sort_by(|&a, &b| {
        let da = (points[ring[a]] - mp).norm_squared();
        let db = (points[ring[b]] - mp).norm_squared();
        da.total_cmp(&db)
    });

    let visible = candidates.into_iter().find(|&i| {
        let vp = points[ring[i]];
        edges.iter().all(|&(a, b)| {
            if a == ring[i] || b == ring[i] || a == m || b == m {
                return true;
            }
            !segments_cross(&mp, &vp, &points[a], &points[b])
        })
    });

    let bridge_at = visible.ok_or_else(|| {
        FastenerError::degenerate("triangulate", "no visible vertex to bridge a hole")
    })?;

    let mut merged = Vec::with_capacity(ring.len() + hole_indices.len() + 2);
    merged.extend_from_slice(&ring[..=bridge_at]);
    for k in 0..=hole_indices.len() {
        merged.push(hole_indices[(start + k) % hole_indices.len()]);
    }
    merged.push(ring[bridge_at]);
    merged.extend_from_slice(&ring[bridge_at + 1..]);
    Ok(merged)
}

fn ear_clip(points: &[Point2<f64>], mut ring: Vec<usize>) -> Result<Vec<[usize; 3]>> {
    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));
    let mut i = 0;
    let mut misses = 0;

    while ring.len() > 3 {
        let n = ring.len();
        if misses > n {
            return Err(FastenerError::degenerate(
                "triangulate",
                format!("no ear found with {} vertices left", n),
            ));
        }

        let prev = (i + n - 1) % n;
        let curr = i % n;
        let next = (i + 1) % n;
        let (a, b, c) = (ring[prev], ring[curr], ring[next]);

        // Bridge seams leave repeated indices behind
        if a == b || b == c || a == c {
            ring.remove(curr);
            i = curr.min(ring.len().saturating_sub(1));
            misses = 0;
            continue;
        }

        if is_ear(points, &ring, a, b, c) {
            triangles.push([a, b, c]);
            ring.remove(curr);
            i = if curr == 0 { 0 } else { curr - 1 };
            misses = 0;
        } else {
            i = (curr + 1) % n;
            misses += 1;
        }
    }

    if let [a, b, c] = ring[..] {
        if a != b && b != c && a != c && orient2d(&points[a], &points[b], &points[c]) > CONVEX_EPSILON {
            triangles.push([a, b, c]);
        }
    }

    if triangles.is_empty() {
        return Err(FastenerError::degenerate("triangulate", "profile produced no triangles"));
    }
    Ok(triangles)
}

fn is_ear(points: &[Point2<f64>], ring: &[usize], a: usize, b: usize, c: usize) -> bool {
    let (pa, pb, pc) = (&points[a], &points[b], &points[c]);
    if orient2d(pa, pb, pc) <= CONVEX_EPSILON {
        return false;
    }
    ring.iter()
        .filter(|&&k| k != a && k != b && k != c)
        .all(|&k| !point_in_triangle(&points[k], pa, pb, pc))
}
