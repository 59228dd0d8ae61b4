// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Brepkit Team

//! Render resolution
//!
//! The evaluator turns declarative [`Shape`] graphs into concrete
//! boundary representations. Resolution is lazy and iterative: a value is
//! rendered repeatedly until it reaches a terminal rendered form, so a
//! node may render to another node (a square renders to a rectangle,
//! which renders to a polygon) before anything touches the kernel.
//! Nothing is cached across calls; every traversal re-renders.

use super::node::{regular_polygon_points, Shape};
use crate::error::{Error, Result};
use crate::hull;
use crate::kernel::{BoundingBox, Brep, Kernel};
use crate::sweep;
use nalgebra::Point2;
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, trace};

/// Deflection tolerance used when none is configured: 0.05 mm.
pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// A value the resolution protocol can be handed: a shape description,
/// an already-rendered solid, or a plain number (which only ever shows up
/// by mistake and is reported, not rendered).
#[derive(Debug, Clone)]
pub enum Value {
    Shape(Rc<Shape>),
    Solid(Brep),
    Number(f64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Shape(shape) => f.write_str(shape.kind_name()),
            Value::Solid(_) => f.write_str("rendered shape"),
            Value::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<Shape> for Value {
    fn from(shape: Shape) -> Self {
        Value::Shape(Rc::new(shape))
    }
}

/// Shape-graph evaluator carrying the kernel and the meshing tolerance.
#[derive(Debug, Clone)]
pub struct Evaluator {
    kernel: Kernel,
    tolerance: f64,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_tolerance(DEFAULT_TOLERANCE)
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            kernel: Kernel::new(),
            tolerance,
        }
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Resolve a value to a boundary representation. Rendered values pass
    /// through untouched; shapes are rendered until terminal; anything
    /// else is an argument error naming the value.
    pub fn resolve(&self, value: &Value) -> Result<Brep> {
        let mut current = value.clone();
        let mut stepped = false;
        loop {
            current = match current {
                Value::Solid(brep) => return Ok(brep),
                Value::Shape(shape) => {
                    trace!(node = shape.kind_name(), "render step");
                    stepped = true;
                    self.render(&shape)?
                }
                other => {
                    // a render step handing back a non-shape reads
                    // differently from being handed one to begin with
                    let msg = if stepped {
                        format!("render returned {other} instead of a rendered shape")
                    } else {
                        format!("attempt to render {other} which is not a shape")
                    };
                    return Err(Error::argument(msg));
                }
            };
        }
    }

    pub fn resolve_shape(&self, shape: &Shape) -> Result<Brep> {
        self.resolve(&Value::Shape(Rc::new(shape.clone())))
    }

    /// One render step for a single node.
    fn render(&self, shape: &Shape) -> Result<Value> {
        let kernel = &self.kernel;
        let tol = self.tolerance;

        let brep = match shape {
            Shape::Rendered(brep) => return Ok(Value::Solid(brep.clone())),

            // flat-shape sugar renders to further nodes
            Shape::Square { size } => {
                return Ok(Shape::rectangle(*size, *size).into());
            }
            Shape::Rectangle { x, y } => {
                let points = vec![
                    Point2::new(0.0, 0.0),
                    Point2::new(*x, 0.0),
                    Point2::new(*x, *y),
                    Point2::new(0.0, *y),
                ];
                return Ok(Shape::polygon(points, None).into());
            }
            Shape::RegularPolygon { sides, diameter } => {
                if *sides < 3 {
                    return Err(Error::argument(
                        "a regular polygon needs at least 3 sides",
                    ));
                }
                return Ok(Shape::polygon(regular_polygon_points(*sides, *diameter), None).into());
            }

            Shape::Box { x, y, z } => kernel.make_box(*x, *y, *z)?,
            Shape::Cylinder { diameter, height } => {
                kernel.make_cylinder(*diameter, *height, tol)?
            }
            Shape::Sphere { diameter } => kernel.make_sphere(*diameter, tol)?,
            Shape::Cone {
                height,
                bottom_dia,
                top_dia,
            } => kernel.make_cone(*height, *bottom_dia, *top_dia, tol)?,
            Shape::Torus {
                inner_dia,
                outer_dia,
                angle,
            } => kernel.make_torus(*inner_dia, *outer_dia, *angle, tol)?,
            Shape::Circle { diameter } => kernel.make_circle(*diameter, tol)?,
            Shape::Polygon { points, paths } => {
                let default_path;
                let paths: &[Vec<usize>] = match paths {
                    Some(paths) => paths,
                    None => {
                        default_path = vec![(0..points.len()).collect::<Vec<_>>()];
                        &default_path
                    }
                };
                kernel.make_polygon(points, paths)?
            }
            Shape::Polyhedron { points, faces } => kernel.make_polyhedron(points, faces)?,

            Shape::Union { a, b } => {
                let a = self.resolve(&Value::Shape(Rc::clone(a)))?;
                let b = self.resolve(&Value::Shape(Rc::clone(b)))?;
                kernel.fuse(&a, &b)?
            }
            Shape::Difference { a, b } => {
                let a = self.resolve(&Value::Shape(Rc::clone(a)))?;
                let b = self.resolve(&Value::Shape(Rc::clone(b)))?;
                kernel.cut(&a, &b)?
            }
            Shape::Intersection { a, b } => {
                let a = self.resolve(&Value::Shape(Rc::clone(a)))?;
                let b = self.resolve(&Value::Shape(Rc::clone(b)))?;
                kernel.common(&a, &b)?
            }

            Shape::Transformed {
                shape: inner,
                transform,
            } => {
                let resolved = self.resolve(&Value::Shape(Rc::clone(inner)))?;
                kernel.transform_brep(&resolved, transform)?
            }

            Shape::LinearExtrusion {
                profile,
                height,
                twist,
            } => {
                let profile = self.resolve(&Value::Shape(Rc::clone(profile)))?;
                sweep::extrude(kernel, &profile, *height, *twist, tol)?
            }
            Shape::Revolution { profile, angle } => {
                let profile = self.resolve(&Value::Shape(Rc::clone(profile)))?;
                sweep::revolve(kernel, &profile, *angle, tol)?
            }

            Shape::Hull { shapes } => {
                let resolved: Vec<Brep> = shapes
                    .iter()
                    .map(|s| self.resolve(&Value::Shape(Rc::clone(s))))
                    .collect::<Result<_>>()?;
                hull::hull(kernel, &resolved)?
            }

            Shape::Imported { path } => kernel.read_stl(path)?,
        };

        Ok(Value::Solid(brep))
    }

    /// Resolve and export as binary STL.
    pub fn write_stl(&self, value: &Value, path: &Path) -> Result<()> {
        let brep = self.resolve(value)?;
        debug!(path = %path.display(), "writing STL");
        self.kernel.write_stl(&brep, path)
    }

    /// Read an STL file into a terminal rendered shape.
    pub fn import_stl(&self, path: &Path) -> Result<Shape> {
        debug!(path = %path.display(), "importing STL");
        Ok(Shape::Rendered(self.kernel.read_stl(path)?))
    }

    /// Resolve and report the axis-aligned bounding box.
    pub fn bounding_box(&self, value: &Value) -> Result<BoundingBox> {
        let brep = self.resolve(value)?;
        Ok(self.kernel.bounding_box(&brep))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::PointState;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_resolving_a_rendered_value_passes_through() {
        let eval = Evaluator::new();
        let brep = eval.resolve_shape(&Shape::cube(1.0)).unwrap();
        let resolved = eval.resolve(&Value::Solid(brep.clone())).unwrap();
        assert!(eval
            .kernel()
            .bounding_box(&resolved)
            .approx_eq(&eval.kernel().bounding_box(&brep), 1e-12));
    }

    #[test]
    fn test_resolving_a_number_names_the_value() {
        let eval = Evaluator::new();
        let err = eval.resolve(&Value::Number(42.0)).unwrap_err();
        assert!(err.is_argument());
        let msg = err.to_string();
        assert!(msg.contains("attempt to render"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn test_square_renders_through_intermediate_nodes() {
        let eval = Evaluator::new();
        let brep = eval.resolve_shape(&Shape::square(2.0)).unwrap();
        assert!(brep.is_sheet());
        let bbox = eval.kernel().bounding_box(&brep);
        assert_relative_eq!(bbox.max.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(bbox.max.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_difference_order_matters() {
        let eval = Evaluator::new();
        let plate = Shape::cuboid(4.0, 4.0, 1.0);
        let post = Shape::cylinder(1.0, 3.0).translate(2.0, 2.0, -1.0);

        let holed = eval.resolve_shape(&plate.clone().difference(post.clone())).unwrap();
        let Brep::Solid(mesh) = &holed else { panic!() };
        assert_eq!(
            eval.kernel().classify(mesh, &Point3::new(2.0, 2.0, 0.5)),
            PointState::Outside
        );

        let reversed = eval.resolve_shape(&post.difference(plate)).unwrap();
        let Brep::Solid(mesh) = &reversed else { panic!() };
        // the post keeps only what pokes out of the plate
        assert_eq!(
            eval.kernel().classify(mesh, &Point3::new(2.0, 2.0, 1.5)),
            PointState::Inside
        );
        assert_eq!(
            eval.kernel().classify(mesh, &Point3::new(2.0, 2.0, 0.5)),
            PointState::Outside
        );
    }

    #[test]
    fn test_union_with_empty_box_is_identity() {
        let eval = Evaluator::new();
        let a = Shape::cuboid(2.0, 2.0, 2.0);
        let empty = Shape::cuboid(1.0, 0.0, 1.0);

        let union = eval.resolve_shape(&a.clone().union(empty)).unwrap();
        let plain = eval.resolve_shape(&a).unwrap();
        assert!(eval
            .kernel()
            .bounding_box(&union)
            .approx_eq(&eval.kernel().bounding_box(&plain), 1e-9));
    }
}
