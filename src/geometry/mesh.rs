// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Indexed triangle mesh and cleanup utilities

use super::BoundingBox;
use ahash::{AHashMap, AHashSet};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Vertex {
    pub fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { position, normal }
    }

    /// Vertex with a placeholder normal, to be filled by `recompute_normals`
    pub fn at(position: Point3<f64>) -> Self {
        Self::new(position, Vector3::z())
    }
}

/// Triangle defined by three vertex indices, counter-clockwise seen from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }

    pub fn is_degenerate(&self) -> bool {
        let [a, b, c] = self.indices;
        a == b || b == c || a == c
    }

    /// Sorted indices plus whether the winding is an even permutation of them
    fn orientation_key(&self) -> ([usize; 3], bool) {
        let mut sorted = self.indices;
        sorted.sort_unstable();
        let rotations = [
            self.indices,
            [self.indices[1], self.indices[2], self.indices[0]],
            [self.indices[2], self.indices[0], self.indices[1]],
        ];
        (sorted, rotations.contains(&sorted))
    }
}

/// Deduplicates points within `epsilon` of each other.
///
/// Points are bucketed in a uniform grid of cell size `epsilon`, so a lookup
/// only searches the 27 neighbouring cells. The first point inserted in a
/// cluster is kept as its representative.
#[derive(Debug, Clone)]
pub struct PointWelder {
    epsilon: f64,
    grid: AHashMap<(i64, i64, i64), Vec<usize>>,
    points: Vec<Point3<f64>>,
}

impl PointWelder {
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            grid: AHashMap::new(),
            points: Vec::new(),
        }
    }

    fn cell(&self, p: &Point3<f64>) -> (i64, i64, i64) {
        (
            (p.x / self.epsilon).floor() as i64,
            (p.y / self.epsilon).floor() as i64,
            (p.z / self.epsilon).floor() as i64,
        )
    }

    /// Index of an existing point within epsilon
    pub fn find(&self, point: &Point3<f64>) -> Option<usize> {
        let (cx, cy, cz) = self.cell(point);
        let epsilon_sq = self.epsilon * self.epsilon;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(bucket) = self.grid.get(&(cx + dx, cy + dy, cz + dz)) {
                        for &candidate in bucket {
                            if (self.points[candidate] - point).norm_squared() < epsilon_sq {
                                return Some(candidate);
                            }
                        }
                    }
                }
            }
        }
        None
    }

    /// Returns the point's index and whether it was newly added
    pub fn insert(&mut self, point: Point3<f64>) -> (usize, bool) {
        if let Some(existing) = self.find(&point) {
            return (existing, false);
        }
        let index = self.points.len();
        let cell = self.cell(&point);
        self.points.push(point);
        self.grid.entry(cell).or_default().push(index);
        (index, true)
    }

    /// Add a point without merging it into an existing cluster
    pub fn push_unique(&mut self, point: Point3<f64>) -> usize {
        let index = self.points.len();
        let cell = self.cell(&point);
        self.points.push(point);
        self.grid.entry(cell).or_default().push(index);
        index
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point3<f64>> {
        self.points
    }
}

/// Triangular mesh; the library's solid representation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        Self::new()
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a vertex at a position and return its index
    pub fn add_point(&mut self, position: Point3<f64>) -> usize {
        self.add_vertex(Vertex::at(position))
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_vertices(&self.vertices)
    }

    /// Positions of a triangle's corners
    pub fn corners(&self, triangle: &Triangle) -> [Point3<f64>; 3] {
        [
            self.vertices[triangle.indices[0]].position,
            self.vertices[triangle.indices[1]].position,
            self.vertices[triangle.indices[2]].position,
        ]
    }

    /// Unit face normal, or `None` for zero-area triangles
    pub fn face_normal(&self, triangle: &Triangle) -> Option<Vector3<f64>> {
        let [a, b, c] = self.corners(triangle);
        let normal = (b - a).cross(&(c - a));
        let length = normal.norm();
        (length > 1e-12).then(|| normal / length)
    }

    /// Move every vertex by an offset
    pub fn translate(&mut self, offset: &Vector3<f64>) {
        for vertex in &mut self.vertices {
            vertex.position += offset;
        }
    }

    pub fn translated(mut self, offset: &Vector3<f64>) -> Self {
        self.translate(offset);
        self
    }

    /// Merge with another mesh (concatenation, no CSG)
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);

        for triangle in &other.triangles {
            self.triangles.push(Triangle::new([
                triangle.indices[0] + offset,
                triangle.indices[1] + offset,
                triangle.indices[2] + offset,
            ]));
        }
    }

    /// Fully de-indexed copy: three private vertices per triangle
    pub fn unindexed(&self) -> Mesh {
        let mut soup = Mesh::with_capacity(self.triangles.len() * 3, self.triangles.len());
        for triangle in &self.triangles {
            let base = soup.vertices.len();
            for &index in &triangle.indices {
                soup.vertices.push(self.vertices[index]);
            }
            soup.triangles.push(Triangle::new([base, base + 1, base + 2]));
        }
        soup
    }

    /// Weld vertices that are within epsilon distance of each other.
    /// Returns the number of vertices removed.
    pub fn weld_vertices(&mut self, epsilon: f64) -> usize {
        if self.vertices.is_empty() {
            return 0;
        }

        let original_count = self.vertices.len();
        let mut welder = PointWelder::new(epsilon);
        let mut new_vertices: Vec<Vertex> = Vec::with_capacity(original_count);
        let mut remap: Vec<usize> = vec![0; original_count];

        for (i, vertex) in self.vertices.iter().enumerate() {
            let (index, inserted) = welder.insert(vertex.position);
            if inserted {
                new_vertices.push(*vertex);
            }
            remap[i] = index;
        }

        for triangle in &mut self.triangles {
            for index in &mut triangle.indices {
                *index = remap[*index];
            }
        }

        self.vertices = new_vertices;
        original_count - self.vertices.len()
    }

    /// Remove triangles that reference the same vertex twice, typically
    /// produced when welding collapses a short edge. Zero-area triangles with
    /// distinct corners are kept since they still close the surface.
    /// Returns the number of triangles removed.
    pub fn remove_degenerate_triangles(&mut self) -> usize {
        let original_count = self.triangles.len();
        self.triangles.retain(|triangle| !triangle.is_degenerate());
        original_count - self.triangles.len()
    }

    /// Collapse triangles spanning the same three vertices.
    ///
    /// Opposite-facing copies cancel pairwise; they are the shared wall
    /// between two sub-solids that touch face to face. Same-facing copies
    /// collapse to one. Returns the number of triangles removed.
    pub fn remove_duplicate_triangles(&mut self) -> usize {
        let original_count = self.triangles.len();
        let mut balance: AHashMap<[usize; 3], (usize, usize)> = AHashMap::new();

        for triangle in &self.triangles {
            let (key, even) = triangle.orientation_key();
            let entry = balance.entry(key).or_insert((0, 0));
            if even {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }

        let mut emitted: AHashSet<[usize; 3]> = AHashSet::new();
        self.triangles.retain(|triangle| {
            let (key, even) = triangle.orientation_key();
            let (forward, backward) = balance[&key];
            let survivor_even = match forward.cmp(&backward) {
                std::cmp::Ordering::Greater => true,
                std::cmp::Ordering::Less => false,
                std::cmp::Ordering::Equal => return false,
            };
            even == survivor_even && emitted.insert(key)
        });

        original_count - self.triangles.len()
    }

    /// Remove orphaned vertices (vertices not referenced by any triangle).
    /// Returns the number of vertices removed.
    pub fn remove_orphaned_vertices(&mut self) -> usize {
        let mut used = vec![false; self.vertices.len()];
        for triangle in &self.triangles {
            for &index in &triangle.indices {
                used[index] = true;
            }
        }

        let mut remap = vec![0; self.vertices.len()];
        let mut new_vertices = Vec::with_capacity(self.vertices.len());
        for (old_index, &is_used) in used.iter().enumerate() {
            if is_used {
                remap[old_index] = new_vertices.len();
                new_vertices.push(self.vertices[old_index]);
            }
        }

        for triangle in &mut self.triangles {
            for index in &mut triangle.indices {
                *index = remap[*index];
            }
        }

        let removed = self.vertices.len() - new_vertices.len();
        self.vertices = new_vertices;
        removed
    }

    /// Recompute vertex normals from triangle geometry.
    /// Face normals are area-weighted and averaged at shared vertices.
    pub fn recompute_normals(&mut self) {
        if self.vertices.is_empty() || self.triangles.is_empty() {
            return;
        }

        let mut normal_sums: Vec<Vector3<f64>> = vec![Vector3::zeros(); self.vertices.len()];
        let mut fallback: Vec<Option<Vector3<f64>>> = vec![None; self.vertices.len()];

        for triangle in &self.triangles {
            let [a, b, c] = self.corners(triangle);
            let face_normal = (b - a).cross(&(c - a));
            let double_area = face_normal.norm();
            if double_area > 1e-12 {
                for &index in &triangle.indices {
                    // Cross product length already carries the area weighting
                    normal_sums[index] += face_normal;
                    fallback[index].get_or_insert(face_normal / double_area);
                }
            }
        }

        for (i, vertex) in self.vertices.iter_mut().enumerate() {
            let sum = normal_sums[i];
            vertex.normal = if sum.norm() > 1e-12 {
                sum.normalize()
            } else {
                // Opposing faces cancelled out, e.g. a cap center touching another cap
                fallback[i].unwrap_or_else(Vector3::z)
            };
        }
    }
}
