// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Brepkit Team

//! Composable affine transforms (3x3 linear part plus translation)

use crate::error::{Error, Result};
use nalgebra::{Matrix3, Point3, Rotation3, Unit, Vector3};
use serde::{Deserialize, Serialize};

/// An affine transform stored as a 3x3 linear part and a translation vector.
///
/// Builder methods construct the elementary transform for the operation and
/// left-multiply it onto the current value (`new = elementary * self`), so a
/// chain like `identity().translate(..).rotate(..)` reads left to right as
/// applied-in-current-frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    linear: Matrix3<f64>,
    translation: Vector3<f64>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            linear: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    pub fn from_parts(linear: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            linear,
            translation,
        }
    }

    pub fn linear(&self) -> &Matrix3<f64> {
        &self.linear
    }

    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    pub fn set_linear(&mut self, linear: Matrix3<f64>) {
        self.linear = linear;
    }

    pub fn set_translation(&mut self, translation: Vector3<f64>) {
        self.translation = translation;
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translate(self, dx: f64, dy: f64, dz: f64) -> Self {
        let elementary = Self::from_parts(Matrix3::identity(), Vector3::new(dx, dy, dz));
        elementary * self
    }

    /// Rotation by `angle` radians around `axis` through the origin.
    pub fn rotate(self, angle: f64, axis: Vector3<f64>) -> Self {
        let rotation = Rotation3::from_axis_angle(&Unit::new_normalize(axis), angle);
        let elementary = Self::from_parts(rotation.into_inner(), Vector3::zeros());
        elementary * self
    }

    /// Per-axis scaling. A zero factor makes the transform singular.
    pub fn scale(self, sx: f64, sy: f64, sz: f64) -> Self {
        let elementary = Self::from_parts(
            Matrix3::from_diagonal(&Vector3::new(sx, sy, sz)),
            Vector3::zeros(),
        );
        elementary * self
    }

    /// Reflection across the plane through the origin with normal
    /// `(nx, ny, nz)`.
    pub fn mirror(self, nx: f64, ny: f64, nz: f64) -> Self {
        let n = Unit::new_normalize(Vector3::new(nx, ny, nz));
        let reflection = Matrix3::identity() - 2.0 * n.into_inner() * n.transpose();
        let elementary = Self::from_parts(reflection, Vector3::zeros());
        elementary * self
    }

    /// Inverse transform. Fails when the linear part is singular
    /// (for example after a zero scale factor).
    pub fn inverse(&self) -> Result<Self> {
        let inv_linear = self
            .linear
            .try_inverse()
            .ok_or_else(|| Error::kernel("cannot invert a singular transform"))?;
        Ok(Self {
            linear: inv_linear,
            translation: -(inv_linear * self.translation),
        })
    }

    /// Apply the transform to a point.
    pub fn apply_point(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.linear * p.coords + self.translation)
    }

    /// Apply only the linear part to a vector.
    pub fn apply_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.linear * v
    }

    /// Determinant of the linear part. Negative for orientation-reversing
    /// transforms such as mirrors.
    pub fn determinant(&self) -> f64 {
        self.linear.determinant()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Composition: `(a * b)` applies `b` first, then `a`.
impl std::ops::Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        Transform {
            linear: self.linear * rhs.linear,
            translation: self.linear * rhs.translation + self.translation,
        }
    }
}
