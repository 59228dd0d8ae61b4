// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Brepkit Team

//! Shell stitching for swept profiles
//!
//! Extrusion and revolution both reduce to the same construction: place
//! copies of a profile wire along a path, stitch consecutive copies with
//! wall quads and close the ends. Open sweeps get triangulated caps; a
//! sweep that returns to its first section closes on itself instead.

use super::face::ear_clip;
use super::{Mesh, Triangle, Vertex};
use crate::error::{Error, Result};
use nalgebra::{Point2, Point3, Vector3};

/// Stitch a sequence of profile sections into a closed shell.
///
/// Every section must hold the same number of points as `profile`, placed
/// in corresponding order, with the profile wound counterclockwise. With
/// `closed_loop` the last section is joined back to the first and no caps
/// are built.
pub fn sweep_sections(
    sections: &[Vec<Point3<f64>>],
    profile: &[Point2<f64>],
    closed_loop: bool,
) -> Result<Mesh> {
    if profile.len() < 3 {
        return Err(Error::argument(
            "a swept profile needs at least 3 points",
        ));
    }
    if sections.len() < 2 {
        return Err(Error::kernel("a sweep needs at least 2 sections"));
    }
    let ring = profile.len();
    if sections.iter().any(|s| s.len() != ring) {
        return Err(Error::kernel(
            "sweep sections do not match the profile point count",
        ));
    }

    let mut mesh = Mesh::new();
    let placeholder = Vector3::z();
    for section in sections {
        for point in section {
            mesh.add_vertex(Vertex::new(*point, placeholder));
        }
    }

    let level = |i: usize, j: usize| i * ring + j % ring;

    let spans = if closed_loop {
        sections.len()
    } else {
        sections.len() - 1
    };
    for i in 0..spans {
        let next = (i + 1) % sections.len();
        for j in 0..ring {
            let a = level(i, j);
            let b = level(i, j + 1);
            let c = level(next, j + 1);
            let d = level(next, j);
            mesh.add_triangle(Triangle::new([a, b, c]));
            mesh.add_triangle(Triangle::new([a, c, d]));
        }
    }

    if !closed_loop {
        let cap = ear_clip(profile)?;
        let last = sections.len() - 1;
        for [p, q, r] in &cap {
            // bottom cap faces backward along the sweep
            mesh.add_triangle(Triangle::new([level(0, *p), level(0, *r), level(0, *q)]));
            mesh.add_triangle(Triangle::new([
                level(last, *p),
                level(last, *q),
                level(last, *r),
            ]));
        }
    }

    // coincident ring points (on-axis revolution, zero twist pivots) weld
    // away together with the triangles they degenerate
    mesh.weld_vertices();
    mesh.recompute_normals();
    Ok(mesh)
}
