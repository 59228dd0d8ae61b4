// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Brepkit Team

//! Planar wires and faces
//!
//! A wire is a closed loop of 2D points in the XY plane (the closing edge is
//! implicit). A face is a bag of boundary wires; which wires bound holes is
//! not stored but recovered with the infinite-point containment test, the
//! same way a face classifier answers it.

use crate::error::{Error, Result};
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

pub type Wire = Vec<Point2<f64>>;

/// A planar face given by its boundary wires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Face {
    pub wires: Vec<Wire>,
}

impl Face {
    pub fn new(wires: Vec<Wire>) -> Self {
        Self { wires }
    }

    pub fn from_outer(outer: Wire) -> Self {
        Self { wires: vec![outer] }
    }

    /// Split boundary wires into (outer, inner) by the containment test.
    pub fn classify_wires(&self) -> (Vec<&Wire>, Vec<&Wire>) {
        let mut outer = Vec::new();
        let mut inner = Vec::new();
        for wire in &self.wires {
            if is_inner_wire(wire) {
                inner.push(wire);
            } else {
                outer.push(wire);
            }
        }
        (outer, inner)
    }
}

/// Twice the signed area of a wire; positive for counterclockwise loops.
pub fn signed_area(wire: &[Point2<f64>]) -> f64 {
    let mut sum = 0.0;
    for i in 0..wire.len() {
        let a = &wire[i];
        let b = &wire[(i + 1) % wire.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum
}

/// Return the wire with counterclockwise sense.
pub fn normalize_ccw(wire: &[Point2<f64>]) -> Wire {
    if signed_area(wire) < 0.0 {
        wire.iter().rev().copied().collect()
    } else {
        wire.to_vec()
    }
}

/// Decide whether `wire` is an inner (hole) boundary: put the wire alone on
/// an empty face and classify a far-away point against it. The probe is OUT
/// only when the nearest boundary edge turns its material-free side toward
/// it; a wire that fails the test bounds a hole.
pub fn is_inner_wire(wire: &[Point2<f64>]) -> bool {
    if wire.len() < 3 {
        return false;
    }

    let mut centroid = Vector2::zeros();
    let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in wire {
        centroid += p.coords;
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    centroid /= wire.len() as f64;

    let reach = (max.coords - centroid).norm().max(1.0);
    let probe = Point2::new(max.x + reach, max.y + 0.618 * reach);
    let direction = (centroid - probe.coords).normalize();

    let mut nearest: Option<(f64, Vector2<f64>)> = None;
    for i in 0..wire.len() {
        let a = &wire[i];
        let b = &wire[(i + 1) % wire.len()];
        if let Some(t) = ray_segment_intersection(&probe, &direction, a, b) {
            if nearest.map_or(true, |(best, _)| t < best) {
                let edge = b - a;
                // material lies left of travel, so outward is the right normal
                nearest = Some((t, Vector2::new(edge.y, -edge.x)));
            }
        }
    }

    match nearest {
        Some((_, outward)) => direction.dot(&outward) >= 0.0,
        None => false,
    }
}

fn ray_segment_intersection(
    origin: &Point2<f64>,
    direction: &Vector2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
) -> Option<f64> {
    const EPS: f64 = 1e-12;
    let edge = b - a;
    let denom = direction.x * edge.y - direction.y * edge.x;
    if denom.abs() < EPS {
        return None;
    }
    let ao = a - origin;
    let t = (ao.x * edge.y - ao.y * edge.x) / denom;
    let s = (ao.x * direction.y - ao.y * direction.x) / -denom;
    (t > EPS && (-1e-9..=1.0 + 1e-9).contains(&s)).then_some(t)
}

/// Triangulate a simple polygon by ear clipping. Triangles index into the
/// input slice and are wound counterclockwise regardless of the input sense.
pub fn ear_clip(polygon: &[Point2<f64>]) -> Result<Vec<[usize; 3]>> {
    const EPS: f64 = 1e-12;

    if polygon.len() < 3 {
        return Err(Error::argument(
            "cannot triangulate a wire with fewer than 3 points",
        ));
    }

    let mut order: Vec<usize> = (0..polygon.len()).collect();
    if signed_area(polygon) < 0.0 {
        order.reverse();
    }

    let cross = |o: usize, p: usize, q: usize| -> f64 {
        let u = polygon[p] - polygon[o];
        let v = polygon[q] - polygon[o];
        u.x * v.y - u.y * v.x
    };

    let mut triangles = Vec::with_capacity(polygon.len() - 2);
    while order.len() > 3 {
        let n = order.len();
        let mut clipped = false;

        for i in 0..n {
            let prev = order[(i + n - 1) % n];
            let cur = order[i];
            let next = order[(i + 1) % n];

            if cross(prev, cur, next) <= EPS {
                continue; // reflex or collinear corner
            }

            let ear_is_empty = order.iter().all(|&j| {
                j == prev
                    || j == cur
                    || j == next
                    || !point_in_triangle(&polygon[j], &polygon[prev], &polygon[cur], &polygon[next])
            });

            if ear_is_empty {
                triangles.push([prev, cur, next]);
                order.remove(i);
                clipped = true;
                break;
            }
        }

        if !clipped {
            return Err(Error::kernel(
                "ear clipping failed on a degenerate or self-intersecting wire",
            ));
        }
    }
    triangles.push([order[0], order[1], order[2]]);
    Ok(triangles)
}

fn point_in_triangle(
    p: &Point2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
) -> bool {
    const EPS: f64 = 1e-12;
    let sign = |p1: &Point2<f64>, p2: &Point2<f64>, p3: &Point2<f64>| {
        (p1.x - p3.x) * (p2.y - p3.y) - (p2.x - p3.x) * (p1.y - p3.y)
    };
    let d1 = sign(p, a, b);
    let d2 = sign(p, b, c);
    let d3 = sign(p, c, a);
    let has_neg = d1 < -EPS || d2 < -EPS || d3 < -EPS;
    let has_pos = d1 > EPS || d2 > EPS || d3 > EPS;
    !(has_neg && has_pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Wire {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(size, 0.0),
            Point2::new(size, size),
            Point2::new(0.0, size),
        ]
    }

    #[test]
    fn test_signed_area_sense() {
        let ccw = square(2.0);
        assert!(signed_area(&ccw) > 0.0);
        let cw: Wire = ccw.iter().rev().copied().collect();
        assert!(signed_area(&cw) < 0.0);
    }

    #[test]
    fn test_inner_wire_detection() {
        let outer = square(4.0);
        assert!(!is_inner_wire(&outer));

        let hole: Wire = square(1.0).iter().rev().copied().collect();
        assert!(is_inner_wire(&hole));
    }

    #[test]
    fn test_picture_frame_classifies_one_outer_one_inner() {
        let outer = square(1.0);
        let hole: Wire = vec![
            Point2::new(0.25, 0.25),
            Point2::new(0.75, 0.25),
            Point2::new(0.75, 0.75),
            Point2::new(0.25, 0.75),
        ]
        .iter()
        .rev()
        .copied()
        .collect();

        let face = Face::new(vec![outer, hole]);
        let (outers, inners) = face.classify_wires();
        assert_eq!(outers.len(), 1);
        assert_eq!(inners.len(), 1);
    }

    #[test]
    fn test_ear_clip_square() {
        let triangles = ear_clip(&square(1.0)).unwrap();
        assert_eq!(triangles.len(), 2);
    }

    #[test]
    fn test_ear_clip_concave_polygon() {
        // L-shaped polygon
        let poly: Wire = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let triangles = ear_clip(&poly).unwrap();
        assert_eq!(triangles.len(), 4);
    }

    #[test]
    fn test_ear_clip_rejects_degenerate_wire() {
        let line: Wire = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert!(ear_clip(&line).is_err());
    }
}
