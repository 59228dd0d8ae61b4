// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Brepkit Team

//! Point-vs-solid classification
//!
//! Classification is orientation-aware: a point looks at the nearest shell
//! triangle along a probe ray and reads the side from that triangle's
//! winding. An inside-out shell therefore classifies a far-away point as
//! `Inside`, which is exactly the signal the hull and polyhedron builders
//! use to correct solid orientation.

use super::Mesh;
use nalgebra::{Point3, Vector3};

/// Classification of a point relative to a closed shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointState {
    Inside,
    Outside,
}

/// Classify `point` against a closed oriented shell.
pub fn classify_point(mesh: &Mesh, point: &Point3<f64>) -> PointState {
    if mesh.is_empty() {
        return PointState::Outside;
    }

    // Aim the probe at the shell so far-away points still produce a hit;
    // the off-axis fallback dodges edge-on hits for symmetric inputs.
    let bbox = mesh.bounding_box();
    let mut direction = bbox.center() - point;
    if direction.norm() < 1e-9 {
        direction = Vector3::new(0.618_033_99, 0.381_966_01, 0.236_067_98);
    }
    let direction = direction.normalize();

    let mut nearest: Option<(f64, Vector3<f64>)> = None;
    for triangle in &mesh.triangles {
        let [v0, v1, v2] = mesh.triangle_points(triangle);
        if let Some(t) = ray_triangle_intersection(point, &direction, v0, v1, v2) {
            if nearest.map_or(true, |(best, _)| t < best) {
                nearest = Some((t, mesh.triangle_normal(triangle)));
            }
        }
    }

    match nearest {
        // the nearest face turns its outward side toward an outside point
        Some((_, normal)) if direction.dot(&normal) > 0.0 => PointState::Inside,
        Some(_) => PointState::Outside,
        None => PointState::Outside,
    }
}

/// A point guaranteed to lie outside any bounded geometry in the mesh,
/// used the way a solid classifier probes "the point at infinity".
pub fn infinite_point(mesh: &Mesh) -> Point3<f64> {
    let bbox = mesh.bounding_box();
    if bbox.is_empty() {
        return Point3::new(1e6, 1e6, 1e6);
    }
    let reach = bbox.size().norm().max(1.0);
    bbox.max + Vector3::new(reach, 1.31 * reach, 1.77 * reach)
}

/// Moeller-Trumbore ray/triangle intersection, returning the ray parameter
/// of a forward hit.
fn ray_triangle_intersection(
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
) -> Option<f64> {
    const EPS: f64 = 1e-12;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = direction.cross(&edge2);
    let a = edge1.dot(&h);

    if a.abs() < EPS {
        return None; // Ray parallel to triangle
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(&h);
    if !(-1e-9..=1.0 + 1e-9).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * direction.dot(&q);
    if v < -1e-9 || u + v > 1.0 + 1e-9 {
        return None;
    }

    let t = f * edge2.dot(&q);
    (t > EPS).then_some(t)
}
