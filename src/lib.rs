// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Brepkit Team

//! Brepkit
//!
//! A constructive-solid-geometry modeling engine: declarative shape
//! graphs (primitives, booleans, sweeps, transforms, convex hulls) are
//! lazily evaluated into boundary solids and exported as binary STL.

pub mod error;
pub mod hull;
pub mod kernel;
pub mod shape;
pub mod sweep;
pub mod transform;

pub use error::{Error, Result};
pub use kernel::{BoundingBox, Brep, Kernel, Mesh};
pub use shape::{Evaluator, Shape, Value, DEFAULT_TOLERANCE};
pub use transform::Transform;

use std::path::Path;

/// Resolve a shape with a default-tolerance evaluator.
pub fn resolve(shape: &Shape) -> Result<Brep> {
    Evaluator::new().resolve_shape(shape)
}

/// Resolve a shape and write it to a binary STL file.
pub fn write_stl(shape: Shape, path: &Path) -> Result<()> {
    Evaluator::new().write_stl(&shape.into(), path)
}
