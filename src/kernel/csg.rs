// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Brepkit Team

//! Boolean set operations on closed shells using BSP trees

use super::{Mesh, Triangle, Vertex};
use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};

const EPSILON: f64 = 1e-5;

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

#[derive(Debug, Clone, Copy)]
pub enum BooleanOp {
    Union,
    Difference,
    Intersection,
}

#[derive(Clone, Copy)]
struct Plane {
    normal: Vector3<f64>,
    w: f64,
}

impl Plane {
    fn from_points(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Self> {
        let normal = (b - a).cross(&(c - a));
        if normal.norm() < 1e-12 {
            return None;
        }
        let normal = normal.normalize();
        Some(Self {
            normal,
            w: normal.dot(&a.coords),
        })
    }

    fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    /// Split `polygon` by this plane into the four output lists. Spanning
    /// polygons get new vertices interpolated on the plane.
    fn split_polygon(
        &self,
        polygon: &Polygon,
        coplanar_front: &mut Vec<Polygon>,
        coplanar_back: &mut Vec<Polygon>,
        front: &mut Vec<Polygon>,
        back: &mut Vec<Polygon>,
    ) {
        let mut polygon_type = COPLANAR;
        let mut types = Vec::with_capacity(polygon.vertices.len());

        for vertex in &polygon.vertices {
            let t = self.normal.dot(&vertex.position.coords) - self.w;
            let vertex_type = if t < -EPSILON {
                BACK
            } else if t > EPSILON {
                FRONT
            } else {
                COPLANAR
            };
            polygon_type |= vertex_type;
            types.push(vertex_type);
        }

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    coplanar_front.push(polygon.clone());
                } else {
                    coplanar_back.push(polygon.clone());
                }
            }
            FRONT => front.push(polygon.clone()),
            BACK => back.push(polygon.clone()),
            _ => {
                let mut f: Vec<Vertex> = Vec::new();
                let mut b: Vec<Vertex> = Vec::new();
                let n = polygon.vertices.len();

                for i in 0..n {
                    let j = (i + 1) % n;
                    let ti = types[i];
                    let tj = types[j];
                    let vi = polygon.vertices[i];
                    let vj = polygon.vertices[j];

                    if ti != BACK {
                        f.push(vi);
                    }
                    if ti != FRONT {
                        b.push(vi);
                    }
                    if (ti | tj) == SPANNING {
                        let di = self.normal.dot(&vi.position.coords) - self.w;
                        let dj = self.normal.dot(&vj.position.coords) - self.w;
                        let t = di / (di - dj);
                        let v = interpolate(&vi, &vj, t);
                        f.push(v);
                        b.push(v);
                    }
                }

                if f.len() >= 3 {
                    front.push(Polygon::new(f, polygon.plane));
                }
                if b.len() >= 3 {
                    back.push(Polygon::new(b, polygon.plane));
                }
            }
        }
    }
}

fn interpolate(a: &Vertex, b: &Vertex, t: f64) -> Vertex {
    Vertex::new(
        a.position + (b.position - a.position) * t,
        a.normal + (b.normal - a.normal) * t,
    )
}

#[derive(Clone)]
struct Polygon {
    vertices: Vec<Vertex>,
    plane: Plane,
}

impl Polygon {
    fn new(vertices: Vec<Vertex>, plane: Plane) -> Self {
        Self { vertices, plane }
    }

    fn flip(&mut self) {
        self.vertices.reverse();
        for v in &mut self.vertices {
            v.normal = -v.normal;
        }
        self.plane.flip();
    }
}

/// BSP tree node
struct BspNode {
    plane: Option<Plane>,
    front: Option<Box<BspNode>>,
    back: Option<Box<BspNode>>,
    polygons: Vec<Polygon>,
}

impl BspNode {
    fn new(polygons: Vec<Polygon>) -> Self {
        let mut node = Self {
            plane: None,
            front: None,
            back: None,
            polygons: Vec::new(),
        };
        if !polygons.is_empty() {
            node.build(polygons);
        }
        node
    }

    fn build(&mut self, polygons: Vec<Polygon>) {
        if polygons.is_empty() {
            return;
        }
        if self.plane.is_none() {
            self.plane = Some(polygons[0].plane);
        }
        let plane = self.plane.unwrap();

        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        let mut front_polys = Vec::new();
        let mut back_polys = Vec::new();
        for polygon in &polygons {
            plane.split_polygon(
                polygon,
                &mut coplanar_front,
                &mut coplanar_back,
                &mut front_polys,
                &mut back_polys,
            );
        }
        self.polygons.extend(coplanar_front);
        self.polygons.extend(coplanar_back);

        if !front_polys.is_empty() {
            self.front
                .get_or_insert_with(|| Box::new(BspNode::new(Vec::new())))
                .build(front_polys);
        }
        if !back_polys.is_empty() {
            self.back
                .get_or_insert_with(|| Box::new(BspNode::new(Vec::new())))
                .build(back_polys);
        }
    }

    fn invert(&mut self) {
        for polygon in &mut self.polygons {
            polygon.flip();
        }
        if let Some(ref mut plane) = self.plane {
            plane.flip();
        }
        if let Some(ref mut front) = self.front {
            front.invert();
        }
        if let Some(ref mut back) = self.back {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Remove the parts of `polygons` inside this tree's solid.
    fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let Some(plane) = self.plane else {
            return polygons;
        };

        let mut front = Vec::new();
        let mut back = Vec::new();
        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        for polygon in &polygons {
            plane.split_polygon(
                polygon,
                &mut coplanar_front,
                &mut coplanar_back,
                &mut front,
                &mut back,
            );
        }
        front.extend(coplanar_front);
        back.extend(coplanar_back);

        let mut front = match &self.front {
            Some(node) => node.clip_polygons(front),
            None => front,
        };
        let back = match &self.back {
            Some(node) => node.clip_polygons(back),
            None => Vec::new(),
        };

        front.extend(back);
        front
    }

    fn clip_to(&mut self, other: &BspNode) {
        self.polygons = other.clip_polygons(std::mem::take(&mut self.polygons));
        if let Some(ref mut front) = self.front {
            front.clip_to(other);
        }
        if let Some(ref mut back) = self.back {
            back.clip_to(other);
        }
    }

    fn all_polygons(&self) -> Vec<Polygon> {
        let mut result = self.polygons.clone();
        if let Some(ref front) = self.front {
            result.extend(front.all_polygons());
        }
        if let Some(ref back) = self.back {
            result.extend(back.all_polygons());
        }
        result
    }
}

fn mesh_to_polygons(mesh: &Mesh) -> Vec<Polygon> {
    let mut polygons = Vec::with_capacity(mesh.triangles.len());
    for triangle in &mesh.triangles {
        let vertices = [
            mesh.vertices[triangle.indices[0]],
            mesh.vertices[triangle.indices[1]],
            mesh.vertices[triangle.indices[2]],
        ];
        // zero-area triangles have no plane and contribute nothing
        if let Some(plane) = Plane::from_points(
            &vertices[0].position,
            &vertices[1].position,
            &vertices[2].position,
        ) {
            polygons.push(Polygon::new(vertices.to_vec(), plane));
        }
    }
    polygons
}

fn polygons_to_mesh(polygons: &[Polygon]) -> Mesh {
    let mut mesh = Mesh::new();
    for polygon in polygons {
        if polygon.vertices.len() < 3 {
            continue;
        }
        // polygons stay convex under BSP splitting, so a fan suffices
        let base = mesh.add_vertex(polygon.vertices[0]);
        let mut prev = mesh.add_vertex(polygon.vertices[1]);
        for vertex in &polygon.vertices[2..] {
            let cur = mesh.add_vertex(*vertex);
            mesh.add_triangle(Triangle::new([base, prev, cur]));
            prev = cur;
        }
    }
    mesh.weld_vertices();
    mesh
}

/// Perform a boolean operation between two closed shells.
pub fn boolean(a: &Mesh, b: &Mesh, op: BooleanOp) -> Result<Mesh> {
    let polys_a = mesh_to_polygons(a);
    let polys_b = mesh_to_polygons(b);

    // empty operands collapse to their algebraic identity
    if polys_b.is_empty() {
        return match op {
            BooleanOp::Union | BooleanOp::Difference => Ok(polygons_to_mesh(&polys_a)),
            BooleanOp::Intersection => Ok(Mesh::empty()),
        };
    }
    if polys_a.is_empty() {
        return match op {
            BooleanOp::Union => Ok(polygons_to_mesh(&polys_b)),
            BooleanOp::Difference | BooleanOp::Intersection => Ok(Mesh::empty()),
        };
    }

    let mut tree_a = BspNode::new(polys_a);
    let mut tree_b = BspNode::new(polys_b);

    match op {
        BooleanOp::Union => {
            tree_a.clip_to(&tree_b);
            tree_b.clip_to(&tree_a);
            tree_b.invert();
            tree_b.clip_to(&tree_a);
            tree_b.invert();
            tree_a.build(tree_b.all_polygons());
        }
        BooleanOp::Difference => {
            tree_a.invert();
            tree_a.clip_to(&tree_b);
            tree_b.clip_to(&tree_a);
            tree_b.invert();
            tree_b.clip_to(&tree_a);
            tree_b.invert();
            tree_a.build(tree_b.all_polygons());
            tree_a.invert();
        }
        BooleanOp::Intersection => {
            tree_a.invert();
            tree_b.clip_to(&tree_a);
            tree_b.invert();
            tree_a.clip_to(&tree_b);
            tree_b.clip_to(&tree_a);
            tree_a.build(tree_b.all_polygons());
            tree_a.invert();
        }
    }

    let mesh = polygons_to_mesh(&tree_a.all_polygons());
    if mesh.vertices.iter().any(|v| !v.position.coords.iter().all(|c| c.is_finite())) {
        return Err(Error::kernel("boolean operation produced a non-finite shell"));
    }
    Ok(mesh)
}
