// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Brepkit Team

//! Mesh-backed geometry kernel
//!
//! The rest of the crate drives geometry exclusively through the [`Kernel`]
//! facade: primitive constructors, boolean operators, affine application,
//! meshing, classification and STL I/O. Shapes are carried between calls as
//! an opaque [`Brep`], either a planar sheet of faces, one closed shell, or
//! a compound of independent shells.

pub mod bbox;
pub mod classify;
pub mod csg;
pub mod face;
pub mod mesh;
pub mod pipe;
pub mod stl;

pub use bbox::BoundingBox;
pub use classify::{classify_point, infinite_point, PointState};
pub use face::{Face, Wire};
pub use mesh::{Mesh, Triangle, Vertex};

use crate::error::{Error, Result};
use crate::transform::Transform;
use csg::BooleanOp;
use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::path::Path;

/// A rendered boundary representation. Never mutated after creation;
/// transforms and booleans produce new values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Brep {
    /// Planar profile in the XY plane, one or more faces
    Sheet(Vec<Face>),
    /// One closed shell
    Solid(Mesh),
    /// Independent shells kept separate
    Compound(Vec<Mesh>),
}

impl Brep {
    /// All shells of a solid or compound, in order.
    pub fn shells(&self) -> &[Mesh] {
        match self {
            Brep::Solid(mesh) => std::slice::from_ref(mesh),
            Brep::Compound(meshes) => meshes,
            Brep::Sheet(_) => &[],
        }
    }

    pub fn is_sheet(&self) -> bool {
        matches!(self, Brep::Sheet(_))
    }
}

/// Triangulation sample of a rendered shape, as consumed by the hull engine.
#[derive(Debug, Clone)]
pub struct Triangulation {
    pub vertices: Vec<Point3<f64>>,
}

/// Facade over the mesh-backed kernel operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct Kernel;

impl Kernel {
    pub fn new() -> Self {
        Self
    }

    /// Segment count for approximating a circle of radius `radius` within
    /// the chordal deflection `tolerance`.
    pub fn segments_for(&self, radius: f64, tolerance: f64) -> usize {
        if radius <= tolerance {
            return 8;
        }
        let step = (1.0 - tolerance / radius).acos();
        ((PI / step).ceil() as usize).clamp(8, 256)
    }

    fn circle_wire(&self, radius: f64, tolerance: f64) -> Wire {
        let segments = self.segments_for(radius, tolerance);
        (0..segments)
            .map(|i| {
                let angle = TAU * i as f64 / segments as f64;
                Point2::new(radius * angle.cos(), radius * angle.sin())
            })
            .collect()
    }

    /// If the shell is inside out, flip it.
    pub fn ensure_outward(&self, mesh: &mut Mesh) {
        if mesh.is_empty() {
            return;
        }
        if classify_point(mesh, &infinite_point(mesh)) == PointState::Inside {
            mesh.reverse_orientation();
        }
    }

    pub fn classify(&self, mesh: &Mesh, point: &Point3<f64>) -> PointState {
        classify_point(mesh, point)
    }

    // ---- primitives ----

    /// Axis-aligned box shell with one corner at the origin. A zero
    /// dimension yields an empty shell.
    pub fn box_mesh(&self, x: f64, y: f64, z: f64) -> Result<Mesh> {
        if x < 0.0 || y < 0.0 || z < 0.0 {
            return Err(Error::argument("box dimensions must be non-negative"));
        }
        if x == 0.0 || y == 0.0 || z == 0.0 {
            return Ok(Mesh::empty());
        }

        let corners = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(x, 0.0, 0.0),
            Point3::new(0.0, y, 0.0),
            Point3::new(x, y, 0.0),
            Point3::new(0.0, 0.0, z),
            Point3::new(x, 0.0, z),
            Point3::new(0.0, y, z),
            Point3::new(x, y, z),
        ];
        // corner index quads, CCW seen from outside
        let quads: [[usize; 4]; 6] = [
            [0, 2, 3, 1],
            [4, 5, 7, 6],
            [0, 1, 5, 4],
            [2, 6, 7, 3],
            [0, 4, 6, 2],
            [1, 3, 7, 5],
        ];

        let mut mesh = Mesh::new();
        for corner in corners {
            mesh.add_vertex(Vertex::new(corner, Vector3::z()));
        }
        for [a, b, c, d] in quads {
            mesh.add_triangle(Triangle::new([a, b, c]));
            mesh.add_triangle(Triangle::new([a, c, d]));
        }
        mesh.recompute_normals();
        Ok(mesh)
    }

    pub fn make_box(&self, x: f64, y: f64, z: f64) -> Result<Brep> {
        Ok(Brep::Solid(self.box_mesh(x, y, z)?))
    }

    /// Cylinder of the given diameter, base on the XY plane, axis +Z.
    pub fn make_cylinder(&self, diameter: f64, height: f64, tolerance: f64) -> Result<Brep> {
        self.make_cone(height, diameter, diameter, tolerance)
    }

    /// Cone along +Z from `bottom_dia` at z=0 to `top_dia` at z=`height`.
    /// A zero top diameter closes to an apex.
    pub fn make_cone(
        &self,
        height: f64,
        bottom_dia: f64,
        top_dia: f64,
        tolerance: f64,
    ) -> Result<Brep> {
        let r0 = bottom_dia / 2.0;
        let r1 = top_dia / 2.0;
        if r0 < 0.0 || r1 < 0.0 || height <= 0.0 {
            return Err(Error::argument(
                "cone needs non-negative diameters and a positive height",
            ));
        }
        if r0 == 0.0 && r1 == 0.0 {
            return Ok(Brep::Solid(Mesh::empty()));
        }

        let profile = self.circle_wire(r0.max(r1), tolerance);
        let section = |radius: f64, z: f64| -> Vec<Point3<f64>> {
            let scale = radius / r0.max(r1);
            profile
                .iter()
                .map(|p| Point3::new(p.x * scale, p.y * scale, z))
                .collect()
        };
        let sections = vec![section(r0, 0.0), section(r1, height)];

        let mut mesh = pipe::sweep_sections(&sections, &profile, false)?;
        self.ensure_outward(&mut mesh);
        Ok(Brep::Solid(mesh))
    }

    /// Sphere of the given diameter centered at the origin.
    pub fn make_sphere(&self, diameter: f64, tolerance: f64) -> Result<Brep> {
        let r = diameter / 2.0;
        if r <= 0.0 {
            return Err(Error::argument("sphere diameter must be positive"));
        }

        let segments = self.segments_for(r, tolerance);
        let stacks = (segments / 2).max(2);

        let mut mesh = Mesh::new();
        for i in 0..=stacks {
            // exact pole rows so welding collapses them to single points
            let (sin_phi, cos_phi) = if i == 0 {
                (0.0, 1.0)
            } else if i == stacks {
                (0.0, -1.0)
            } else {
                (PI * i as f64 / stacks as f64).sin_cos()
            };
            for j in 0..segments {
                let theta = TAU * j as f64 / segments as f64;
                let n = Vector3::new(sin_phi * theta.cos(), sin_phi * theta.sin(), cos_phi);
                mesh.add_vertex(Vertex::new(Point3::from(n * r), n));
            }
        }

        let idx = |i: usize, j: usize| i * segments + j % segments;
        for i in 0..stacks {
            for j in 0..segments {
                let a = idx(i, j);
                let b = idx(i + 1, j);
                let c = idx(i + 1, j + 1);
                let d = idx(i, j + 1);
                mesh.add_triangle(Triangle::new([a, b, c]));
                mesh.add_triangle(Triangle::new([a, c, d]));
            }
        }

        // pole rings collapse to the pole points
        mesh.weld_vertices();
        self.ensure_outward(&mut mesh);
        Ok(Brep::Solid(mesh))
    }

    /// Torus around the Z axis. `inner_dia` is twice the distance from the
    /// axis to the tube center, `outer_dia` twice the tube radius. With an
    /// `angle` the torus is swept partially and capped.
    pub fn make_torus(
        &self,
        inner_dia: f64,
        outer_dia: f64,
        angle: Option<f64>,
        tolerance: f64,
    ) -> Result<Brep> {
        let major = inner_dia / 2.0;
        let minor = outer_dia / 2.0;
        if major <= 0.0 || minor <= 0.0 {
            return Err(Error::argument("torus diameters must be positive"));
        }

        let sweep = angle.unwrap_or(TAU).clamp(0.0, TAU);
        if sweep == 0.0 {
            return Ok(Brep::Solid(Mesh::empty()));
        }
        let full = angle.is_none() || (sweep - TAU).abs() < 1e-12;

        let profile = self.circle_wire(minor, tolerance);
        let around = self.segments_for(major + minor, tolerance);
        let steps = ((around as f64 * sweep / TAU).ceil() as usize).max(3);

        let count = if full { steps } else { steps + 1 };
        let sections: Vec<Vec<Point3<f64>>> = (0..count)
            .map(|i| {
                let u = sweep * i as f64 / steps as f64;
                profile
                    .iter()
                    .map(|p| {
                        let radial = major + p.x;
                        Point3::new(radial * u.cos(), radial * u.sin(), p.y)
                    })
                    .collect()
            })
            .collect();

        let mut mesh = pipe::sweep_sections(&sections, &profile, full)?;
        self.ensure_outward(&mut mesh);
        Ok(Brep::Solid(mesh))
    }

    /// Planar disc in the XY plane, centered at the origin.
    pub fn make_circle(&self, diameter: f64, tolerance: f64) -> Result<Brep> {
        let r = diameter / 2.0;
        if r <= 0.0 {
            return Err(Error::argument("circle diameter must be positive"));
        }
        Ok(Brep::Sheet(vec![Face::from_outer(
            self.circle_wire(r, tolerance),
        )]))
    }

    /// Planar face from indexed point paths. The first path bounds the
    /// outside; the remaining paths bound holes.
    pub fn make_polygon(&self, points: &[Point2<f64>], paths: &[Vec<usize>]) -> Result<Brep> {
        if paths.is_empty() {
            return Err(Error::argument("a polygon needs at least one path"));
        }

        let lookup = |path: &[usize]| -> Result<Wire> {
            path.iter()
                .map(|&i| {
                    points.get(i).copied().ok_or_else(|| {
                        Error::argument(format!("polygon path references point {i} of {}", points.len()))
                    })
                })
                .collect()
        };

        let mut wires = Vec::with_capacity(paths.len());
        let outer = lookup(&paths[0])?;
        if outer.len() < 3 {
            return Err(Error::argument("a polygon path needs at least 3 points"));
        }
        wires.push(face::normalize_ccw(&outer));
        for path in &paths[1..] {
            let hole = lookup(path)?;
            if hole.len() < 3 {
                return Err(Error::argument("a polygon path needs at least 3 points"));
            }
            // holes carry the opposite sense
            let mut hole = face::normalize_ccw(&hole);
            hole.reverse();
            wires.push(hole);
        }

        Ok(Brep::Sheet(vec![Face::new(wires)]))
    }

    /// Solid from per-face point loops: triangulate each face, sew the
    /// shells together and fix a shell that came out inside out.
    pub fn make_polyhedron(
        &self,
        points: &[Point3<f64>],
        faces: &[Vec<usize>],
    ) -> Result<Brep> {
        if faces.len() < 4 {
            return Err(Error::argument("a polyhedron needs at least 4 faces"));
        }

        let mut mesh = Mesh::new();
        for loop_indices in faces {
            let corners: Vec<Point3<f64>> = loop_indices
                .iter()
                .map(|&i| {
                    points.get(i).copied().ok_or_else(|| {
                        Error::argument(format!(
                            "polyhedron face references point {i} of {}",
                            points.len()
                        ))
                    })
                })
                .collect::<Result<_>>()?;
            if corners.len() < 3 {
                return Err(Error::argument("a polyhedron face needs at least 3 points"));
            }

            let flat = project_to_plane(&corners)?;
            let base = mesh.vertex_count();
            for corner in &corners {
                mesh.add_vertex(Vertex::new(*corner, Vector3::z()));
            }
            for [a, b, c] in face::ear_clip(&flat)? {
                mesh.add_triangle(Triangle::new([base + a, base + b, base + c]));
            }
        }

        mesh.weld_vertices();
        // sewing tolerates faces handed in with either sense; the flood
        // repairs them against their neighbors before the closure check
        mesh.orient_consistently();
        if !mesh.is_closed() {
            return Err(Error::kernel(
                "failed sewing polyhedron faces into a closed shell",
            ));
        }
        mesh.recompute_normals();
        self.ensure_outward(&mut mesh);
        Ok(Brep::Solid(mesh))
    }

    /// Straight prism of a planar face along +Z. Hole wires become
    /// through-cavities of the outer prism.
    pub fn prism(&self, profile: &Face, height: f64) -> Result<Mesh> {
        if height <= 0.0 {
            return Err(Error::kernel("failed making a prism of non-positive height"));
        }

        let (outers, inners) = profile.classify_wires();
        if outers.is_empty() {
            return Err(Error::kernel("prism profile has no outer wire"));
        }

        let lift = |wire: &Wire| -> Result<Mesh> {
            let ccw = face::normalize_ccw(wire);
            let sections = vec![
                ccw.iter().map(|p| Point3::new(p.x, p.y, 0.0)).collect(),
                ccw.iter().map(|p| Point3::new(p.x, p.y, height)).collect(),
            ];
            pipe::sweep_sections(&sections, &ccw, false)
        };

        let mut solid = Mesh::empty();
        for outer in outers {
            solid = csg::boolean(&solid, &lift(outer)?, BooleanOp::Union)?;
        }
        let mut cavity = Mesh::empty();
        for inner in inners {
            cavity = csg::boolean(&cavity, &lift(inner)?, BooleanOp::Union)?;
        }
        csg::boolean(&solid, &cavity, BooleanOp::Difference)
    }

    // ---- booleans ----

    pub fn fuse(&self, a: &Brep, b: &Brep) -> Result<Brep> {
        let a = self.collapse(a)?;
        let b = self.collapse(b)?;
        Ok(Brep::Solid(csg::boolean(&a, &b, BooleanOp::Union)?))
    }

    pub fn cut(&self, a: &Brep, b: &Brep) -> Result<Brep> {
        let a = self.collapse(a)?;
        let b = self.collapse(b)?;
        Ok(Brep::Solid(csg::boolean(&a, &b, BooleanOp::Difference)?))
    }

    pub fn common(&self, a: &Brep, b: &Brep) -> Result<Brep> {
        let a = self.collapse(a)?;
        let b = self.collapse(b)?;
        Ok(Brep::Solid(csg::boolean(&a, &b, BooleanOp::Intersection)?))
    }

    /// Union a solid or compound down to one shell.
    fn collapse(&self, brep: &Brep) -> Result<Mesh> {
        if brep.is_sheet() {
            return Err(Error::kernel("boolean operations require solids"));
        }
        let mut result = Mesh::empty();
        for shell in brep.shells() {
            result = csg::boolean(&result, shell, BooleanOp::Union)?;
        }
        Ok(result)
    }

    // ---- transforms, queries, I/O ----

    /// Apply an affine transform. Planar sheets only accept transforms that
    /// keep them in the XY plane; an orientation-reversing in-plane
    /// transform flips each wire back to its original sense.
    pub fn transform_brep(&self, brep: &Brep, transform: &Transform) -> Result<Brep> {
        match brep {
            Brep::Solid(mesh) => {
                let mut mesh = mesh.clone();
                mesh.apply_transform(transform);
                Ok(Brep::Solid(mesh))
            }
            Brep::Compound(meshes) => Ok(Brep::Compound(
                meshes
                    .iter()
                    .map(|m| {
                        let mut m = m.clone();
                        m.apply_transform(transform);
                        m
                    })
                    .collect(),
            )),
            Brep::Sheet(faces) => {
                let linear = transform.linear();
                let det2 = linear[(0, 0)] * linear[(1, 1)] - linear[(0, 1)] * linear[(1, 0)];

                let mut out = Vec::with_capacity(faces.len());
                for face in faces {
                    let mut wires = Vec::with_capacity(face.wires.len());
                    for wire in &face.wires {
                        let mut mapped = Wire::with_capacity(wire.len());
                        for p in wire {
                            let q = transform.apply_point(&Point3::new(p.x, p.y, 0.0));
                            if q.z.abs() > 1e-9 {
                                return Err(Error::kernel(
                                    "transform moves a planar profile out of its plane",
                                ));
                            }
                            mapped.push(Point2::new(q.x, q.y));
                        }
                        if det2 < 0.0 {
                            mapped.reverse();
                        }
                        wires.push(mapped);
                    }
                    out.push(Face::new(wires));
                }
                Ok(Brep::Sheet(out))
            }
        }
    }

    pub fn bounding_box(&self, brep: &Brep) -> BoundingBox {
        match brep {
            Brep::Sheet(faces) => {
                let mut bbox = BoundingBox::empty();
                for face in faces {
                    for wire in &face.wires {
                        for p in wire {
                            bbox.expand_to_include(&Point3::new(p.x, p.y, 0.0));
                        }
                    }
                }
                bbox
            }
            _ => {
                let mut bbox = BoundingBox::empty();
                for shell in brep.shells() {
                    bbox.union(&shell.bounding_box());
                }
                bbox
            }
        }
    }

    /// Triangulation vertex sample of a rendered shape. Sheets report their
    /// face triangulations at z = 0.
    pub fn mesh(&self, brep: &Brep) -> Result<Triangulation> {
        let mut vertices = Vec::new();
        match brep {
            Brep::Sheet(faces) => {
                for face in faces {
                    for wire in &face.wires {
                        vertices.extend(wire.iter().map(|p| Point3::new(p.x, p.y, 0.0)));
                    }
                }
            }
            _ => {
                for shell in brep.shells() {
                    vertices.extend(shell.vertices.iter().map(|v| v.position));
                }
            }
        }
        if vertices.is_empty() {
            return Err(Error::kernel("no triangulation available"));
        }
        Ok(Triangulation { vertices })
    }

    /// Write a solid or compound as binary STL.
    pub fn write_stl(&self, brep: &Brep, path: &Path) -> Result<()> {
        if brep.is_sheet() {
            return Err(Error::kernel("cannot export a planar sheet to STL"));
        }
        let mut merged = Mesh::empty();
        for shell in brep.shells() {
            merged.merge(shell);
        }
        stl::write_stl(&merged, path)
    }

    pub fn read_stl(&self, path: &Path) -> Result<Brep> {
        Ok(Brep::Solid(stl::read_stl(path)?))
    }
}

/// Project a planar 3D loop into 2D coordinates on its own plane.
fn project_to_plane(corners: &[Point3<f64>]) -> Result<Vec<Point2<f64>>> {
    // Newell normal tolerates slightly non-planar input
    let mut normal: Vector3<f64> = Vector3::zeros();
    for i in 0..corners.len() {
        let a = &corners[i];
        let b = &corners[(i + 1) % corners.len()];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    if normal.norm() < 1e-12 {
        return Err(Error::argument("polyhedron face is degenerate"));
    }
    let normal = normal.normalize();

    let u = if normal.x.abs() < 0.9 {
        Vector3::x().cross(&normal).normalize()
    } else {
        Vector3::y().cross(&normal).normalize()
    };
    let v = normal.cross(&u);

    let origin = corners[0];
    Ok(corners
        .iter()
        .map(|p| {
            let d = p - origin;
            Point2::new(d.dot(&u), d.dot(&v))
        })
        .collect())
}
