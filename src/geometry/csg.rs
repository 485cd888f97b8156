// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CSG (Constructive Solid Geometry) difference using BSP trees
//!
//! Polygons are split exactly along node planes. The raw result is a polygon
//! soup with T-junctions wherever one side of an edge was split and the other
//! was not; `polygons_to_mesh` welds it, inserts the missing edge vertices and
//! triangulates, so a successful subtraction yields an indexed closed mesh.

use super::mesh::PointWelder;
use super::{Mesh, Triangle};
use crate::error::{FastenerError, Result};
use nalgebra::{Point3, Vector3};

/// Distance below which a point counts as lying on a plane
const PLANE_EPSILON: f64 = 1e-5;
/// Result vertices closer than this are merged
const WELD_EPSILON: f64 = 1e-5;

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

#[derive(Debug, Clone, Copy)]
struct Plane {
    normal: Vector3<f64>,
    w: f64,
}

#[derive(Debug, Clone)]
struct Polygon {
    vertices: Vec<Point3<f64>>,
    plane: Plane,
}

/// BSP tree node for CSG operations
#[derive(Debug, Clone, Default)]
struct BSPNode {
    plane: Option<Plane>,
    front: Option<Box<BSPNode>>,
    back: Option<Box<BSPNode>>,
    polygons: Vec<Polygon>,
}

impl Plane {
    fn from_points(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Self> {
        let normal = (b - a).cross(&(c - a));
        let length = normal.norm();
        if length < 1e-12 {
            return None;
        }
        let normal = normal / length;
        Some(Self {
            normal,
            w: normal.dot(&a.coords),
        })
    }

    fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    fn classify_point(&self, point: &Point3<f64>) -> u8 {
        let distance = self.normal.dot(&point.coords) - self.w;
        if distance < -PLANE_EPSILON {
            BACK
        } else if distance > PLANE_EPSILON {
            FRONT
        } else {
            COPLANAR
        }
    }

    /// Sort a polygon into the four output lists, splitting it if it spans the plane
    fn split_polygon(
        &self,
        polygon: Polygon,
        coplanar_front: &mut Vec<Polygon>,
        coplanar_back: &mut Vec<Polygon>,
        front: &mut Vec<Polygon>,
        back: &mut Vec<Polygon>,
    ) {
        let types: Vec<u8> = polygon
            .vertices
            .iter()
            .map(|v| self.classify_point(v))
            .collect();
        let polygon_type = types.iter().fold(COPLANAR, |acc, t| acc | t);

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    coplanar_front.push(polygon);
                } else {
                    coplanar_back.push(polygon);
                }
            }
            FRONT => front.push(polygon),
            BACK => back.push(polygon),
            _ => {
                let n = polygon.vertices.len();
                let mut f = Vec::with_capacity(n + 1);
                let mut b = Vec::with_capacity(n + 1);
                for i in 0..n {
                    let j = (i + 1) % n;
                    let (ti, tj) = (types[i], types[j]);
                    let (vi, vj) = (polygon.vertices[i], polygon.vertices[j]);
                    if ti != BACK {
                        f.push(vi);
                    }
                    if ti != FRONT {
                        b.push(vi);
                    }
                    if (ti | tj) == SPANNING {
                        let t = (self.w - self.normal.dot(&vi.coords))
                            / self.normal.dot(&(vj - vi));
                        let v = vi + (vj - vi) * t;
                        f.push(v);
                        b.push(v);
                    }
                }
                if f.len() >= 3 {
                    front.push(Polygon {
                        vertices: f,
                        plane: polygon.plane,
                    });
                }
                if b.len() >= 3 {
                    back.push(Polygon {
                        vertices: b,
                        plane: polygon.plane,
                    });
                }
            }
        }
    }
}

impl Polygon {
    fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }
}

impl BSPNode {
    fn new(polygons: Vec<Polygon>) -> Self {
        let mut node = Self::default();
        node.build(polygons);
        node
    }

    /// Convert solid space to empty space and empty space to solid space
    fn invert(&mut self) {
        for polygon in &mut self.polygons {
            polygon.flip();
        }
        if let Some(plane) = self.plane.as_mut() {
            plane.flip();
        }
        if let Some(front) = self.front.as_mut() {
            front.invert();
        }
        if let Some(back) = self.back.as_mut() {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Remove the parts of `polygons` that are inside this tree's solid
    fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let Some(plane) = self.plane else {
            return polygons;
        };

        let mut front = Vec::new();
        let mut back = Vec::new();
        for polygon in polygons {
            let (mut coplanar_front, mut coplanar_back) = (Vec::new(), Vec::new());
            plane.split_polygon(polygon, &mut coplanar_front, &mut coplanar_back, &mut front, &mut back);
            front.append(&mut coplanar_front);
            back.append(&mut coplanar_back);
        }

        let mut result = match &self.front {
            Some(node) => node.clip_polygons(front),
            None => front,
        };
        if let Some(node) = &self.back {
            result.extend(node.clip_polygons(back));
        }
        result
    }

    fn clip_to(&mut self, bsp: &BSPNode) {
        self.polygons = bsp.clip_polygons(std::mem::take(&mut self.polygons));
        if let Some(front) = self.front.as_mut() {
            front.clip_to(bsp);
        }
        if let Some(back) = self.back.as_mut() {
            back.clip_to(bsp);
        }
    }

    fn all_polygons(&self) -> Vec<Polygon> {
        let mut result = self.polygons.clone();
        if let Some(front) = &self.front {
            result.extend(front.all_polygons());
        }
        if let Some(back) = &self.back {
            result.extend(back.all_polygons());
        }
        result
    }

    fn build(&mut self, polygons: Vec<Polygon>) {
        if polygons.is_empty() {
            return;
        }
        let plane = *self.plane.get_or_insert(polygons[0].plane);

        let mut front = Vec::new();
        let mut back = Vec::new();
        for polygon in polygons {
            let (mut coplanar_front, mut coplanar_back) = (Vec::new(), Vec::new());
            plane.split_polygon(polygon, &mut coplanar_front, &mut coplanar_back, &mut front, &mut back);
            self.polygons.append(&mut coplanar_front);
            self.polygons.append(&mut coplanar_back);
        }

        if !front.is_empty() {
            self.front.get_or_insert_with(Default::default).build(front);
        }
        if !back.is_empty() {
            self.back.get_or_insert_with(Default::default).build(back);
        }
    }
}

/// Convert mesh to polygons, skipping zero-area triangles
fn mesh_to_polygons(mesh: &Mesh) -> Vec<Polygon> {
    mesh.triangles
        .iter()
        .filter_map(|triangle| {
            let [a, b, c] = mesh.corners(triangle);
            Plane::from_points(&a, &b, &c).map(|plane| Polygon {
                vertices: vec![a, b, c],
                plane,
            })
        })
        .collect()
}

fn drop_repeated_indices(loop_indices: &mut Vec<usize>) {
    loop_indices.dedup();
    while loop_indices.len() > 1 && loop_indices.first() == loop_indices.last() {
        loop_indices.pop();
    }
}

/// Points from `points` lying strictly inside segment `ab`, ordered from `a`
fn points_on_segment(points: &[Point3<f64>], a: usize, b: usize) -> Vec<usize> {
    let (pa, pb) = (points[a], points[b]);
    let direction = pb - pa;
    let length_sq = direction.norm_squared();
    if length_sq < WELD_EPSILON * WELD_EPSILON {
        return Vec::new();
    }

    let lo = pa.coords.inf(&pb.coords).add_scalar(-WELD_EPSILON);
    let hi = pa.coords.sup(&pb.coords).add_scalar(WELD_EPSILON);

    let mut found: Vec<(f64, usize)> = points
        .iter()
        .enumerate()
        .filter(|&(k, p)| {
            k != a
                && k != b
                && (0..3).all(|axis| p.coords[axis] >= lo[axis] && p.coords[axis] <= hi[axis])
        })
        .filter_map(|(k, p)| {
            let t = (p - pa).dot(&direction) / length_sq;
            if t <= 0.0 || t >= 1.0 {
                return None;
            }
            let closest = pa + direction * t;
            ((p - closest).norm() < WELD_EPSILON).then_some((t, k))
        })
        .collect();

    found.sort_by(|x, y| x.0.total_cmp(&y.0));
    found.into_iter().map(|(_, k)| k).collect()
}

fn has_collinear_corner(points: &[Point3<f64>], loop_indices: &[usize]) -> bool {
    let n = loop_indices.len();
    (0..n).any(|i| {
        let prev = points[loop_indices[(i + n - 1) % n]];
        let curr = points[loop_indices[i]];
        let next = points[loop_indices[(i + 1) % n]];
        let (e1, e2) = (curr - prev, next - curr);
        e1.cross(&e2).norm() <= 1e-9 * e1.norm() * e2.norm()
    })
}

/// Weld, repair T-junctions and triangulate a polygon soup
fn polygons_to_mesh(polygons: &[Polygon]) -> Mesh {
    let mut welder = PointWelder::new(WELD_EPSILON);
    let mut loops: Vec<Vec<usize>> = polygons
        .iter()
        .map(|polygon| {
            let mut indices: Vec<usize> =
                polygon.vertices.iter().map(|v| welder.insert(*v).0).collect();
            drop_repeated_indices(&mut indices);
            indices
        })
        .filter(|indices| indices.len() >= 3)
        .collect();

    let points = welder.points().to_vec();
    for loop_indices in &mut loops {
        let n = loop_indices.len();
        let mut repaired = Vec::with_capacity(n);
        for i in 0..n {
            let (a, b) = (loop_indices[i], loop_indices[(i + 1) % n]);
            repaired.push(a);
            repaired.extend(points_on_segment(&points, a, b));
        }
        *loop_indices = repaired;
    }

    let mut mesh = Mesh::with_capacity(points.len(), loops.len() * 3);
    for point in &points {
        mesh.add_point(*point);
    }

    for loop_indices in &loops {
        if loop_indices.len() > 3 && has_collinear_corner(&points, loop_indices) {
            // Fan from the centroid; every edge vertex stays a real corner
            let centroid = loop_indices
                .iter()
                .fold(Vector3::zeros(), |acc, &k| acc + points[k].coords)
                / loop_indices.len() as f64;
            let center = mesh.add_point(Point3::from(centroid));
            let n = loop_indices.len();
            for i in 0..n {
                mesh.add_triangle(Triangle::new([center, loop_indices[i], loop_indices[(i + 1) % n]]));
            }
        } else {
            for i in 1..loop_indices.len() - 1 {
                mesh.add_triangle(Triangle::new([
                    loop_indices[0],
                    loop_indices[i],
                    loop_indices[i + 1],
                ]));
            }
        }
    }

    mesh.recompute_normals();
    mesh
}

/// Perform CSG difference `a - b` using BSP trees
pub fn csg_difference(a: &Mesh, b: &Mesh) -> Result<Mesh> {
    let polys_a = mesh_to_polygons(a);
    let polys_b = mesh_to_polygons(b);
    if polys_a.is_empty() || polys_b.is_empty() {
        return Err(FastenerError::degenerate("csg", "operand has no usable faces"));
    }

    let mut tree_a = BSPNode::new(polys_a);
    let mut tree_b = BSPNode::new(polys_b);

    tree_a.invert();
    tree_a.clip_to(&tree_b);
    tree_b.clip_to(&tree_a);
    tree_b.invert();
    tree_b.clip_to(&tree_a);
    tree_b.invert();
    tree_a.build(tree_b.all_polygons());
    tree_a.invert();

    let result = polygons_to_mesh(&tree_a.all_polygons());
    if result.is_empty() {
        return Err(FastenerError::degenerate("csg", "difference removed every face"));
    }
    Ok(result)
}
