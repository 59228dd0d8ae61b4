// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Brepkit Team

//! Declarative shape nodes
//!
//! A `Shape` is a cheap, immutable description of geometry. Nothing here
//! touches the kernel; nodes are built up by the front-end API and turned
//! into boundary solids by the evaluator. Children are shared through
//! `Rc`, so a profile can feed several sweeps without cloning geometry.

use crate::kernel::Brep;
use crate::transform::Transform;
use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::ops::{Add, Mul, Sub};
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Shape {
    Box {
        x: f64,
        y: f64,
        z: f64,
    },
    Cylinder {
        diameter: f64,
        height: f64,
    },
    Sphere {
        diameter: f64,
    },
    Cone {
        height: f64,
        bottom_dia: f64,
        top_dia: f64,
    },
    Torus {
        inner_dia: f64,
        outer_dia: f64,
        angle: Option<f64>,
    },
    Circle {
        diameter: f64,
    },
    Rectangle {
        x: f64,
        y: f64,
    },
    Square {
        size: f64,
    },
    RegularPolygon {
        sides: usize,
        diameter: f64,
    },
    Polygon {
        points: Vec<Point2<f64>>,
        paths: Option<Vec<Vec<usize>>>,
    },
    Polyhedron {
        points: Vec<Point3<f64>>,
        faces: Vec<Vec<usize>>,
    },
    Union {
        a: Rc<Shape>,
        b: Rc<Shape>,
    },
    Difference {
        a: Rc<Shape>,
        b: Rc<Shape>,
    },
    Intersection {
        a: Rc<Shape>,
        b: Rc<Shape>,
    },
    Transformed {
        shape: Rc<Shape>,
        transform: Transform,
    },
    LinearExtrusion {
        profile: Rc<Shape>,
        height: f64,
        twist: f64,
    },
    Revolution {
        profile: Rc<Shape>,
        angle: Option<f64>,
    },
    Hull {
        shapes: Vec<Rc<Shape>>,
    },
    /// Leaf read from an STL file at render time
    Imported {
        path: PathBuf,
    },
    /// Terminal: already resolved to a boundary representation
    Rendered(Brep),
}

impl Shape {
    pub fn cuboid(x: f64, y: f64, z: f64) -> Self {
        Shape::Box { x, y, z }
    }

    pub fn cube(size: f64) -> Self {
        Shape::Box {
            x: size,
            y: size,
            z: size,
        }
    }

    pub fn cylinder(diameter: f64, height: f64) -> Self {
        Shape::Cylinder { diameter, height }
    }

    pub fn sphere(diameter: f64) -> Self {
        Shape::Sphere { diameter }
    }

    /// Cone from `bottom_dia` at the base to `top_dia` at the top; a zero
    /// top diameter closes to an apex.
    pub fn cone(height: f64, bottom_dia: f64, top_dia: f64) -> Self {
        Shape::Cone {
            height,
            bottom_dia,
            top_dia,
        }
    }

    pub fn torus(inner_dia: f64, outer_dia: f64) -> Self {
        Shape::Torus {
            inner_dia,
            outer_dia,
            angle: None,
        }
    }

    pub fn torus_section(inner_dia: f64, outer_dia: f64, angle: f64) -> Self {
        Shape::Torus {
            inner_dia,
            outer_dia,
            angle: Some(angle),
        }
    }

    pub fn circle(diameter: f64) -> Self {
        Shape::Circle { diameter }
    }

    pub fn rectangle(x: f64, y: f64) -> Self {
        Shape::Rectangle { x, y }
    }

    pub fn square(size: f64) -> Self {
        Shape::Square { size }
    }

    pub fn regular_polygon(sides: usize, diameter: f64) -> Self {
        Shape::RegularPolygon { sides, diameter }
    }

    /// Planar polygon; without explicit paths the points form one outer
    /// loop in order.
    pub fn polygon(points: Vec<Point2<f64>>, paths: Option<Vec<Vec<usize>>>) -> Self {
        Shape::Polygon { points, paths }
    }

    pub fn polyhedron(points: Vec<Point3<f64>>, faces: Vec<Vec<usize>>) -> Self {
        Shape::Polyhedron { points, faces }
    }

    pub fn union(self, other: Shape) -> Self {
        Shape::Union {
            a: Rc::new(self),
            b: Rc::new(other),
        }
    }

    pub fn difference(self, other: Shape) -> Self {
        Shape::Difference {
            a: Rc::new(self),
            b: Rc::new(other),
        }
    }

    pub fn intersection(self, other: Shape) -> Self {
        Shape::Intersection {
            a: Rc::new(self),
            b: Rc::new(other),
        }
    }

    pub fn hull(shapes: Vec<Shape>) -> Self {
        Shape::Hull {
            shapes: shapes.into_iter().map(Rc::new).collect(),
        }
    }

    /// Solid read from an STL file when the node is rendered.
    pub fn import(path: impl Into<PathBuf>) -> Self {
        Shape::Imported { path: path.into() }
    }

    pub fn extrude(self, height: f64, twist: f64) -> Self {
        Shape::LinearExtrusion {
            profile: Rc::new(self),
            height,
            twist,
        }
    }

    pub fn revolve(self, angle: Option<f64>) -> Self {
        Shape::Revolution {
            profile: Rc::new(self),
            angle,
        }
    }

    /// Wrap in (or compose onto) an affine transform. Transforming a node
    /// that is already `Transformed` composes into its existing transform
    /// instead of nesting wrappers.
    fn compose(self, apply: impl FnOnce(Transform) -> Transform) -> Self {
        match self {
            Shape::Transformed { shape, transform } => Shape::Transformed {
                shape,
                transform: apply(transform),
            },
            other => Shape::Transformed {
                shape: Rc::new(other),
                transform: apply(Transform::identity()),
            },
        }
    }

    pub fn translate(self, dx: f64, dy: f64, dz: f64) -> Self {
        self.compose(|t| t.translate(dx, dy, dz))
    }

    pub fn rotate(self, angle: f64, axis: Vector3<f64>) -> Self {
        self.compose(|t| t.rotate(angle, axis))
    }

    pub fn scale(self, sx: f64, sy: f64, sz: f64) -> Self {
        self.compose(|t| t.scale(sx, sy, sz))
    }

    pub fn mirror(self, nx: f64, ny: f64, nz: f64) -> Self {
        self.compose(|t| t.mirror(nx, ny, nz))
    }

    /// Variant name, used when a resolution error needs to say what it
    /// was looking at.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Box { .. } => "box",
            Shape::Cylinder { .. } => "cylinder",
            Shape::Sphere { .. } => "sphere",
            Shape::Cone { .. } => "cone",
            Shape::Torus { .. } => "torus",
            Shape::Circle { .. } => "circle",
            Shape::Rectangle { .. } => "rectangle",
            Shape::Square { .. } => "square",
            Shape::RegularPolygon { .. } => "regular polygon",
            Shape::Polygon { .. } => "polygon",
            Shape::Polyhedron { .. } => "polyhedron",
            Shape::Union { .. } => "union",
            Shape::Difference { .. } => "difference",
            Shape::Intersection { .. } => "intersection",
            Shape::Transformed { .. } => "transformed shape",
            Shape::LinearExtrusion { .. } => "linear extrusion",
            Shape::Revolution { .. } => "revolution",
            Shape::Hull { .. } => "hull",
            Shape::Imported { .. } => "imported solid",
            Shape::Rendered(_) => "rendered shape",
        }
    }
}

/// Points of a regular polygon inscribed in the given diameter, first
/// vertex on the +X axis.
pub(crate) fn regular_polygon_points(sides: usize, diameter: f64) -> Vec<Point2<f64>> {
    let r = diameter / 2.0;
    (0..sides)
        .map(|i| {
            let a = TAU * i as f64 / sides as f64;
            Point2::new(r * a.cos(), r * a.sin())
        })
        .collect()
}

impl Add for Shape {
    type Output = Shape;

    fn add(self, rhs: Shape) -> Shape {
        self.union(rhs)
    }
}

impl Sub for Shape {
    type Output = Shape;

    fn sub(self, rhs: Shape) -> Shape {
        self.difference(rhs)
    }
}

impl Mul for Shape {
    type Output = Shape;

    fn mul(self, rhs: Shape) -> Shape {
        self.intersection(rhs)
    }
}
