// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Brepkit Team

//! Triangle-mesh shell representation used by the kernel

use super::BoundingBox;
use crate::transform::Transform;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Vertex with position and normal
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Vertex {
    pub fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { position, normal }
    }
}

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }
}

/// Indexed triangular mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.vertices.iter().map(|v| &v.position))
    }

    /// Positions of one triangle's corners.
    pub fn triangle_points(&self, tri: &Triangle) -> [&Point3<f64>; 3] {
        [
            &self.vertices[tri.indices[0]].position,
            &self.vertices[tri.indices[1]].position,
            &self.vertices[tri.indices[2]].position,
        ]
    }

    /// Geometric (winding-derived) normal of one triangle, unnormalized.
    pub fn triangle_normal(&self, tri: &Triangle) -> Vector3<f64> {
        let [a, b, c] = self.triangle_points(tri);
        (b - a).cross(&(c - a))
    }

    /// Apply an affine transform to all vertices. Normals use the inverse
    /// transpose of the linear part; orientation-reversing transforms also
    /// flip the triangle winding so shells stay outward-oriented.
    pub fn apply_transform(&mut self, transform: &Transform) {
        let normal_matrix = transform
            .linear()
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or_else(|| *transform.linear());

        for vertex in &mut self.vertices {
            vertex.position = transform.apply_point(&vertex.position);
            let n = normal_matrix * vertex.normal;
            if n.norm() > 1e-12 {
                vertex.normal = n.normalize();
            }
        }

        if transform.determinant() < 0.0 {
            self.reverse_orientation();
        }
    }

    /// Flip every triangle's winding and negate normals.
    pub fn reverse_orientation(&mut self) {
        for triangle in &mut self.triangles {
            triangle.indices.swap(1, 2);
        }
        for vertex in &mut self.vertices {
            vertex.normal = -vertex.normal;
        }
    }

    /// Merge another mesh into this one (no boolean semantics)
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

    /// Weld vertices that share a position bit-for-bit and drop triangles
    /// that degenerate in the process. Returns the number of vertices removed.
    pub fn weld_vertices(&mut self) -> usize {
        let original_count = self.vertices.len();
        let mut keyed: HashMap<[u64; 3], usize> = HashMap::new();
        let mut new_vertices: Vec<Vertex> = Vec::new();
        let mut remap: Vec<usize> = Vec::with_capacity(original_count);

        for vertex in &self.vertices {
            let key = position_key(&vertex.position);
            let idx = *keyed.entry(key).or_insert_with(|| {
                new_vertices.push(*vertex);
                new_vertices.len() - 1
            });
            remap.push(idx);
        }

        let mut new_triangles = Vec::with_capacity(self.triangles.len());
        for triangle in &self.triangles {
            let mapped = [
                remap[triangle.indices[0]],
                remap[triangle.indices[1]],
                remap[triangle.indices[2]],
            ];
            if mapped[0] != mapped[1] && mapped[1] != mapped[2] && mapped[0] != mapped[2] {
                new_triangles.push(Triangle::new(mapped));
            }
        }

        self.vertices = new_vertices;
        self.triangles = new_triangles;
        original_count - self.vertices.len()
    }

    /// Recompute vertex normals by area-weighted averaging of face normals.
    pub fn recompute_normals(&mut self) {
        if self.vertices.is_empty() || self.triangles.is_empty() {
            return;
        }

        let mut sums: Vec<Vector3<f64>> = vec![Vector3::zeros(); self.vertices.len()];
        for triangle in &self.triangles {
            let face_normal = self.triangle_normal(triangle);
            if face_normal.norm() > 1e-12 {
                for &idx in &triangle.indices {
                    sums[idx] += face_normal;
                }
            }
        }

        for (vertex, sum) in self.vertices.iter_mut().zip(sums) {
            if sum.norm() > 1e-12 {
                vertex.normal = sum.normalize();
            }
        }
    }

    /// Make triangle windings agree across shared edges by flooding the
    /// seed triangle's orientation through each connected component. Two
    /// neighbors agree when they traverse their shared edge in opposite
    /// directions. Returns the number of triangles flipped; the component
    /// as a whole may still end up inside out, which the caller fixes.
    pub fn orient_consistently(&mut self) -> usize {
        let mut by_edge: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for (t, triangle) in self.triangles.iter().enumerate() {
            let [a, b, c] = triangle.indices;
            for (u, v) in [(a, b), (b, c), (c, a)] {
                let key = if u < v { (u, v) } else { (v, u) };
                by_edge.entry(key).or_default().push(t);
            }
        }

        let has_directed = |tri: &Triangle, u: usize, v: usize| {
            let [a, b, c] = tri.indices;
            (a, b) == (u, v) || (b, c) == (u, v) || (c, a) == (u, v)
        };

        let mut flipped = 0;
        let mut visited = vec![false; self.triangles.len()];
        let mut queue = std::collections::VecDeque::new();
        for seed in 0..self.triangles.len() {
            if visited[seed] {
                continue;
            }
            visited[seed] = true;
            queue.push_back(seed);
            while let Some(t) = queue.pop_front() {
                let [a, b, c] = self.triangles[t].indices;
                for (u, v) in [(a, b), (b, c), (c, a)] {
                    let key = if u < v { (u, v) } else { (v, u) };
                    for &n in &by_edge[&key] {
                        if n == t || visited[n] {
                            continue;
                        }
                        if has_directed(&self.triangles[n], u, v) {
                            self.triangles[n].indices.swap(1, 2);
                            flipped += 1;
                        }
                        visited[n] = true;
                        queue.push_back(n);
                    }
                }
            }
        }
        flipped
    }

    /// Check that every edge is shared by at most two triangles.
    pub fn is_manifold(&self) -> bool {
        self.edge_counts().values().all(|&count| count <= 2)
    }

    /// Check that every edge is shared by exactly two triangles.
    pub fn is_closed(&self) -> bool {
        !self.triangles.is_empty() && self.edge_counts().values().all(|&count| count == 2)
    }

    fn edge_counts(&self) -> HashMap<(usize, usize), u32> {
        let mut counts: HashMap<(usize, usize), u32> = HashMap::new();
        for triangle in &self.triangles {
            let [i0, i1, i2] = triangle.indices;
            for (a, b) in [(i0, i1), (i1, i2), (i2, i0)] {
                let key = if a < b { (a, b) } else { (b, a) };
                *counts.entry(key).or_insert(0) += 1;
            }
        }
        counts
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

fn position_key(p: &Point3<f64>) -> [u64; 3] {
    // +0.0 and -0.0 compare equal but have different bits
    let norm = |v: f64| if v == 0.0 { 0.0f64 } else { v };
    [
        norm(p.x).to_bits(),
        norm(p.y).to_bits(),
        norm(p.z).to_bits(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri_mesh() -> Mesh {
        let mut mesh = Mesh::new();
        let n = Vector3::z();
        let a = mesh.add_vertex(Vertex::new(Point3::new(0.0, 0.0, 0.0), n));
        let b = mesh.add_vertex(Vertex::new(Point3::new(1.0, 0.0, 0.0), n));
        let c = mesh.add_vertex(Vertex::new(Point3::new(0.0, 1.0, 0.0), n));
        mesh.add_triangle(Triangle::new([a, b, c]));
        mesh
    }

    #[test]
    fn test_weld_merges_coincident_vertices() {
        let mut mesh = tri_mesh();
        let other = tri_mesh();
        mesh.merge(&other);
        assert_eq!(mesh.vertex_count(), 6);

        let removed = mesh.weld_vertices();
        assert_eq!(removed, 3);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_reverse_orientation_flips_normal() {
        let mut mesh = tri_mesh();
        let before = mesh.triangle_normal(&mesh.triangles[0].clone());
        mesh.reverse_orientation();
        let after = mesh.triangle_normal(&mesh.triangles[0].clone());
        assert!(before.dot(&after) < 0.0);
    }

    #[test]
    fn test_orient_consistently_repairs_a_flipped_triangle() {
        let mut mesh = Mesh::new();
        let n = Vector3::z();
        for p in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ] {
            mesh.add_vertex(Vertex::new(p, n));
        }
        mesh.add_triangle(Triangle::new([0, 1, 2]));
        // second half of the quad, wound against its neighbor
        mesh.add_triangle(Triangle::new([0, 3, 2]));

        let before_a = mesh.triangle_normal(&mesh.triangles[0].clone());
        let before_b = mesh.triangle_normal(&mesh.triangles[1].clone());
        assert!(before_a.dot(&before_b) < 0.0);

        assert_eq!(mesh.orient_consistently(), 1);
        let after_a = mesh.triangle_normal(&mesh.triangles[0].clone());
        let after_b = mesh.triangle_normal(&mesh.triangles[1].clone());
        assert!(after_a.dot(&after_b) > 0.0);
    }

    #[test]
    fn test_mirror_transform_keeps_winding_sense() {
        let mut mesh = tri_mesh();
        let mirror = Transform::identity().mirror(1.0, 0.0, 0.0);
        mesh.apply_transform(&mirror);
        // winding flip compensates the reflection, so the geometric normal
        // still agrees with the stored vertex normals
        let n = mesh.triangle_normal(&mesh.triangles[0].clone());
        assert!(n.dot(&mesh.vertices[0].normal) > 0.0);
    }
}
