// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Brepkit Team

//! Binary STL import and export

use super::{Mesh, Triangle, Vertex};
use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Write a mesh to a binary STL file.
pub fn write_stl(mesh: &Mesh, path: &Path) -> Result<()> {
    let triangles: Vec<stl_io::Triangle> = mesh
        .triangles
        .iter()
        .map(|tri| {
            let [a, b, c] = mesh.triangle_points(tri);
            let n = mesh.triangle_normal(tri);
            let n = if n.norm() > 1e-12 {
                n.normalize()
            } else {
                Vector3::z()
            };
            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [
                    stl_io::Vertex::new([a.x as f32, a.y as f32, a.z as f32]),
                    stl_io::Vertex::new([b.x as f32, b.y as f32, b.z as f32]),
                    stl_io::Vertex::new([c.x as f32, c.y as f32, c.z as f32]),
                ],
            }
        })
        .collect();

    let mut file = File::create(path)
        .map_err(|e| Error::kernel(format!("failed to create {}: {}", path.display(), e)))?;
    stl_io::write_stl(&mut file, triangles.iter())
        .map_err(|e| Error::kernel(format!("failed to write {}: {}", path.display(), e)))?;
    Ok(())
}

/// Read an STL file (binary or ASCII) into a mesh.
pub fn read_stl(path: &Path) -> Result<Mesh> {
    let file = File::open(path)
        .map_err(|e| Error::kernel(format!("failed to open {}: {}", path.display(), e)))?;
    let mut reader = BufReader::new(file);
    let indexed = stl_io::read_stl(&mut reader)
        .map_err(|e| Error::kernel(format!("failed to parse {}: {}", path.display(), e)))?;

    let mut mesh = Mesh::new();
    for v in &indexed.vertices {
        mesh.add_vertex(Vertex::new(
            Point3::new(v[0] as f64, v[1] as f64, v[2] as f64),
            Vector3::z(),
        ));
    }
    for face in &indexed.faces {
        mesh.add_triangle(Triangle::new([
            face.vertices[0],
            face.vertices[1],
            face.vertices[2],
        ]));
    }
    mesh.weld_vertices();
    mesh.recompute_normals();
    Ok(mesh)
}
