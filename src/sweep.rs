// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Brepkit Team

//! Sweep engine: linear extrusion (straight or twisted) and revolution
//!
//! Untwisted extrusion takes the straight-prism fast path through the
//! kernel. Everything else is a generalized sweep: profile sections are
//! placed along a spine and stitched into shells, with outer and hole
//! wires swept separately and recombined as `outer - union(inner)`.

use crate::error::{Error, Result};
use crate::kernel::face::{self, Wire};
use crate::kernel::{pipe, Brep, Kernel, Mesh};
use nalgebra::Point3;
use std::f64::consts::{FRAC_PI_2, TAU};
use tracing::debug;

/// Ruled surface guiding a twisted sweep: one rail runs straight up the
/// axis, the other traces the twist. Subdivided so no segment spans more
/// than 90 degrees of twist.
#[derive(Debug, Clone)]
pub struct SpineSupport {
    poles: Vec<[Point3<f64>; 2]>,
    height: f64,
    twist: f64,
}

impl SpineSupport {
    pub fn new(height: f64, twist: f64) -> Result<Self> {
        if !(height > 0.0) || !twist.is_finite() {
            return Err(Error::kernel(
                "failed setting the twisted surface-normal for the sweep",
            ));
        }

        let segments = (twist.abs() / FRAC_PI_2 + 1.0) as usize;
        let seg_height = height / segments as f64;
        let seg_twist = twist / segments as f64;

        let poles = (0..=segments)
            .map(|i| {
                let z = seg_height * i as f64;
                let angle = seg_twist * i as f64;
                [
                    Point3::new(0.0, 0.0, z),
                    Point3::new(angle.cos(), angle.sin(), z),
                ]
            })
            .collect();

        Ok(Self {
            poles,
            height,
            twist,
        })
    }

    pub fn segments(&self) -> usize {
        self.poles.len() - 1
    }

    /// Twist angle at height `z`, interpolated linearly along the spine.
    pub fn angle_at(&self, z: f64) -> f64 {
        self.twist * (z / self.height).clamp(0.0, 1.0)
    }
}

/// Linearly extrude a planar profile along +Z, optionally twisting it
/// about the axis as it rises.
pub fn extrude(kernel: &Kernel, profile: &Brep, height: f64, twist: f64, tolerance: f64) -> Result<Brep> {
    let Brep::Sheet(faces) = profile else {
        return Err(Error::argument("extrusion profile must be a planar shape"));
    };

    if twist == 0.0 {
        debug!(height, "straight extrusion");
        let mut solids: Vec<Mesh> = faces
            .iter()
            .map(|face| kernel.prism(face, height))
            .collect::<Result<_>>()?;
        return Ok(if solids.len() == 1 {
            Brep::Solid(solids.pop().unwrap())
        } else {
            Brep::Compound(solids)
        });
    }

    let support = SpineSupport::new(height, twist)?;
    debug!(height, twist, segments = support.segments(), "twisted extrusion");

    let radius = faces
        .iter()
        .flat_map(|f| &f.wires)
        .flatten()
        .fold(0.0f64, |r, p| r.max(p.coords.norm()));
    let steps = twist_steps(kernel, &support, radius, tolerance);

    let sweep_wire = |wire: &Wire| -> Result<Mesh> {
        let ccw = face::normalize_ccw(wire);
        let sections: Vec<Vec<Point3<f64>>> = (0..=steps)
            .map(|i| {
                let z = height * i as f64 / steps as f64;
                let angle = support.angle_at(z);
                let (sin, cos) = angle.sin_cos();
                ccw.iter()
                    .map(|p| Point3::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos, z))
                    .collect()
            })
            .collect();
        let mesh = pipe::sweep_sections(&sections, &ccw, false)?;
        if !mesh.is_closed() {
            return Err(Error::kernel("failed making extrusion solid"));
        }
        Ok(mesh)
    };

    let mut solids = Vec::with_capacity(faces.len());
    for face in faces {
        solids.push(sweep_face_wires(kernel, face, &sweep_wire)?);
    }
    Ok(if solids.len() == 1 {
        Brep::Solid(solids.pop().unwrap())
    } else {
        Brep::Compound(solids)
    })
}

/// Revolve a planar profile about the Y axis. `None` sweeps a full
/// circle; a given angle is clamped to `[0, 2pi]` and the ends capped.
pub fn revolve(kernel: &Kernel, profile: &Brep, angle: Option<f64>, tolerance: f64) -> Result<Brep> {
    let Brep::Sheet(faces) = profile else {
        return Err(Error::argument("revolution profile must be a planar shape"));
    };

    let sweep = angle.unwrap_or(TAU).clamp(0.0, TAU);
    if sweep == 0.0 {
        return Err(Error::kernel("failed making revolution solid"));
    }
    let full = angle.is_none() || (sweep - TAU).abs() < 1e-12;
    debug!(sweep, full, "revolution");

    let radius = faces
        .iter()
        .flat_map(|f| &f.wires)
        .flatten()
        .fold(0.0f64, |r, p| r.max(p.x.abs()));
    let around = kernel.segments_for(radius.max(1e-9), tolerance);
    let steps = ((around as f64 * sweep / TAU).ceil() as usize).max(3);

    let sweep_wire = |wire: &Wire| -> Result<Mesh> {
        let ccw = face::normalize_ccw(wire);
        let count = if full { steps } else { steps + 1 };
        let sections: Vec<Vec<Point3<f64>>> = (0..count)
            .map(|i| {
                let a = sweep * i as f64 / steps as f64;
                let (sin, cos) = a.sin_cos();
                ccw.iter()
                    .map(|p| Point3::new(p.x * cos, p.y, -p.x * sin))
                    .collect()
            })
            .collect();
        let mut mesh = pipe::sweep_sections(&sections, &ccw, full)?;
        if !mesh.is_closed() {
            return Err(Error::kernel("failed making revolution solid"));
        }
        kernel.ensure_outward(&mut mesh);
        Ok(mesh)
    };

    let mut solids = Vec::with_capacity(faces.len());
    for face in faces {
        solids.push(sweep_face_wires(kernel, face, &sweep_wire)?);
    }
    Ok(if solids.len() == 1 {
        Brep::Solid(solids.pop().unwrap())
    } else {
        Brep::Compound(solids)
    })
}

/// Sweep every boundary wire of a face independently and recombine:
/// hole-wire solids are unioned and subtracted from the outer solid.
fn sweep_face_wires<F>(kernel: &Kernel, face: &face::Face, sweep_wire: &F) -> Result<Mesh>
where
    F: Fn(&Wire) -> Result<Mesh>,
{
    let (outers, inners) = face.classify_wires();
    if outers.is_empty() {
        return Err(Error::kernel("sweep profile has no outer wire"));
    }

    let mut outer = Brep::Solid(Mesh::empty());
    for wire in outers {
        outer = kernel.fuse(&outer, &Brep::Solid(sweep_wire(wire)?))?;
    }

    let mut cavity = Brep::Solid(Mesh::empty());
    for wire in inners {
        cavity = kernel.fuse(&cavity, &Brep::Solid(sweep_wire(wire)?))?;
    }

    let Brep::Solid(result) = kernel.cut(&outer, &cavity)? else {
        return Err(Error::kernel("sweep boolean returned a non-solid"));
    };
    Ok(result)
}

/// Section count for a twisted sweep: at least one section per support
/// pole row, refined by the chordal tolerance at the profile's extent.
fn twist_steps(kernel: &Kernel, support: &SpineSupport, radius: f64, tolerance: f64) -> usize {
    let by_tolerance = if radius > 0.0 {
        let per_turn = kernel.segments_for(radius, tolerance);
        (per_turn as f64 * support.twist.abs() / TAU).ceil() as usize
    } else {
        0
    };
    by_tolerance.max(support.segments()).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::classify::{classify_point, PointState};
    use approx::assert_relative_eq;
    use nalgebra::Point2;
    use std::f64::consts::PI;

    fn unit_square_sheet(kernel: &Kernel) -> Brep {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        kernel.make_polygon(&points, &[vec![0, 1, 2, 3]]).unwrap()
    }

    #[test]
    fn test_spine_support_segment_rule() {
        assert_eq!(SpineSupport::new(1.0, PI / 4.0).unwrap().segments(), 1);
        assert_eq!(SpineSupport::new(1.0, PI).unwrap().segments(), 3);
        assert_eq!(SpineSupport::new(1.0, -PI).unwrap().segments(), 3);
        assert_eq!(SpineSupport::new(1.0, 2.0 * PI).unwrap().segments(), 5);
    }

    #[test]
    fn test_spine_support_rejects_degenerate_height() {
        assert!(SpineSupport::new(0.0, 1.0).is_err());
        assert!(SpineSupport::new(-2.0, 1.0).is_err());
    }

    #[test]
    fn test_straight_extrusion_bounding_box() {
        let kernel = Kernel::new();
        let profile = unit_square_sheet(&kernel);
        let solid = extrude(&kernel, &profile, 5.0, 0.0, 0.05).unwrap();

        let bbox = kernel.bounding_box(&solid);
        assert_relative_eq!(bbox.min.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.min.z, 0.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.max.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.max.y, 1.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.max.z, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_twisted_extrusion_is_closed_and_manifold() {
        let kernel = Kernel::new();
        // centered profile, so the twist axis stays interior
        let points = vec![
            Point2::new(-0.5, -0.5),
            Point2::new(0.5, -0.5),
            Point2::new(0.5, 0.5),
            Point2::new(-0.5, 0.5),
        ];
        let profile = kernel.make_polygon(&points, &[vec![0, 1, 2, 3]]).unwrap();
        let solid = extrude(&kernel, &profile, 4.0, PI, 0.05).unwrap();

        let Brep::Solid(mesh) = &solid else { panic!() };
        assert!(mesh.is_closed());
        assert!(mesh.is_manifold());
        assert_eq!(
            classify_point(mesh, &Point3::new(0.1, 0.0, 2.0)),
            PointState::Inside
        );
    }

    #[test]
    fn test_extrusion_rejects_solid_profile() {
        let kernel = Kernel::new();
        let solid = kernel.make_box(1.0, 1.0, 1.0).unwrap();
        let err = extrude(&kernel, &solid, 2.0, 0.0, 0.05).unwrap_err();
        assert!(err.is_argument());
    }

    #[test]
    fn test_full_revolution_of_offset_square_is_a_ring() {
        let kernel = Kernel::new();
        let points = vec![
            Point2::new(2.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(3.0, 1.0),
            Point2::new(2.0, 1.0),
        ];
        let profile = kernel.make_polygon(&points, &[vec![0, 1, 2, 3]]).unwrap();
        let solid = revolve(&kernel, &profile, None, 0.05).unwrap();

        let Brep::Solid(mesh) = &solid else { panic!() };
        assert!(mesh.is_closed());
        assert_eq!(
            classify_point(mesh, &Point3::new(2.5, 0.5, 0.0)),
            PointState::Inside
        );
        // on the axis, inside the ring's hole
        assert_eq!(
            classify_point(mesh, &Point3::new(0.0, 0.5, 0.0)),
            PointState::Outside
        );
    }

    #[test]
    fn test_partial_revolution_is_capped() {
        let kernel = Kernel::new();
        let points = vec![
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
        ];
        let profile = kernel.make_polygon(&points, &[vec![0, 1, 2, 3]]).unwrap();
        let solid = revolve(&kernel, &profile, Some(PI), 0.05).unwrap();

        let Brep::Solid(mesh) = &solid else { panic!() };
        assert!(mesh.is_closed());
        assert_eq!(
            classify_point(mesh, &Point3::new(0.0, 0.5, 1.5)),
            PointState::Outside
        );
    }

    #[test]
    fn test_revolution_angle_is_clamped() {
        let kernel = Kernel::new();
        let points = vec![
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
        ];
        let profile = kernel.make_polygon(&points, &[vec![0, 1, 2, 3]]).unwrap();

        let clamped = revolve(&kernel, &profile, Some(10.0), 0.05).unwrap();
        let full = revolve(&kernel, &profile, None, 0.05).unwrap();
        assert!(kernel
            .bounding_box(&clamped)
            .approx_eq(&kernel.bounding_box(&full), 1e-9));
    }
}
