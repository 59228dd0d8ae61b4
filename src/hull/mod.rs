// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Brepkit Team

//! Convex hull of rendered shapes
//!
//! The facet enumerator returns unordered coplanar vertex sets; this
//! module rebuilds each facet as a correctly wound face (centroid,
//! reference vector, angle sort), sews the faces into one shell,
//! solidifies and fixes an inside-out result. Enumerator teardown and its
//! allocation accounting run on both the success and the failure path.

pub mod enumerator;

pub use enumerator::{FacetEnumerator, HullFacet};

use crate::error::{Error, Result};
use crate::kernel::{Brep, Kernel, Mesh, Triangle, Vertex};
use nalgebra::{Point3, Vector3};
use tracing::debug;

/// Convex hull of already-rendered shapes: sample their triangulation
/// vertices, enumerate hull facets, and sew the wound facets into a solid.
pub fn hull(kernel: &Kernel, inputs: &[Brep]) -> Result<Brep> {
    let mut points: Vec<Point3<f64>> = Vec::new();
    for brep in inputs {
        points.extend(kernel.mesh(brep)?.vertices);
    }
    if points.is_empty() {
        return Err(Error::argument("hull needs at least one shape"));
    }
    debug!(points = points.len(), shapes = inputs.len(), "hull sampling");

    let mut interior = Vector3::zeros();
    for p in &points {
        interior += p.coords;
    }
    let interior = Point3::from(interior / points.len() as f64);

    let run = FacetEnumerator::run(&points)?;
    let built = build_shell(kernel, run.facets(), &interior);
    let teardown = run.free();
    let mesh = built?;
    teardown?;

    Ok(Brep::Solid(mesh))
}

fn build_shell(kernel: &Kernel, facets: &[HullFacet], interior: &Point3<f64>) -> Result<Mesh> {
    let mut mesh = Mesh::new();
    for facet in facets {
        let wound = wind_facet(facet, interior)?;
        let base = mesh.vertex_count();
        for p in &wound {
            mesh.add_vertex(Vertex::new(*p, Vector3::z()));
        }
        for i in 1..wound.len() - 1 {
            mesh.add_triangle(Triangle::new([base, base + i, base + i + 1]));
        }
    }

    mesh.weld_vertices();
    if !mesh.is_closed() {
        return Err(Error::kernel(
            "failed sewing hull facets into a closed shell",
        ));
    }
    mesh.recompute_normals();
    kernel.ensure_outward(&mut mesh);
    Ok(mesh)
}

/// Order an unordered facet vertex set counterclockwise seen from outside
/// the hull: pick the facet centroid, a reference direction toward the
/// first vertex, recover the facet normal from the first non-degenerate
/// cross product, point it away from the hull interior, and sort by
/// signed angle around it.
fn wind_facet(facet: &HullFacet, interior: &Point3<f64>) -> Result<Vec<Point3<f64>>> {
    if facet.vertices.len() < 3 {
        return Err(Error::argument("hull facet has fewer than 3 vertices"));
    }

    let mut centroid = Vector3::zeros();
    for v in &facet.vertices {
        centroid += v.coords;
    }
    let centroid = Point3::from(centroid / facet.vertices.len() as f64);

    let reference = facet.vertices[0] - centroid;
    if reference.norm() < 1e-12 {
        return Err(Error::argument("no usable normal for a hull facet"));
    }

    let mut normal = Vector3::zeros();
    for v in &facet.vertices[1..] {
        let candidate = reference.cross(&(v - centroid));
        if candidate.norm() > 1e-7 {
            normal = candidate.normalize();
            break;
        }
    }
    if normal.norm() < 0.5 {
        return Err(Error::argument("no usable normal for a hull facet"));
    }
    if normal.dot(&(centroid - interior)) < 0.0 {
        normal = -normal;
    }

    let mut ordered = facet.vertices.clone();
    ordered.sort_by(|a, b| {
        let angle = |p: &Point3<f64>| {
            let d = p - centroid;
            let y = reference.cross(&d).dot(&normal);
            let x = reference.dot(&d);
            y.atan2(x)
        };
        angle(a).partial_cmp(&angle(b)).unwrap()
    });
    Ok(ordered)
}
