// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Brepkit Team

//! Extrusion and revolution through the full evaluation pipeline

use approx::assert_relative_eq;
use brepkit::kernel::PointState;
use brepkit::{Brep, Evaluator, Shape};
use nalgebra::{Point2, Point3};
use std::f64::consts::PI;

fn picture_frame() -> Shape {
    // 10x10 plate with a centered 4x4 cutout
    let points = vec![
        Point2::new(0.0, 0.0),
        Point2::new(10.0, 0.0),
        Point2::new(10.0, 10.0),
        Point2::new(0.0, 10.0),
        Point2::new(3.0, 3.0),
        Point2::new(7.0, 3.0),
        Point2::new(7.0, 7.0),
        Point2::new(3.0, 7.0),
    ];
    Shape::polygon(points, Some(vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]))
}

#[test]
fn test_untwisted_unit_square_extrusion_bounding_box() {
    let eval = Evaluator::new();
    let solid = Shape::square(1.0).extrude(5.0, 0.0);
    let bbox = eval.bounding_box(&solid.into()).unwrap();
    assert_relative_eq!(bbox.min.x, 0.0, epsilon = 1e-9);
    assert_relative_eq!(bbox.min.y, 0.0, epsilon = 1e-9);
    assert_relative_eq!(bbox.min.z, 0.0, epsilon = 1e-9);
    assert_relative_eq!(bbox.max.x, 1.0, epsilon = 1e-9);
    assert_relative_eq!(bbox.max.y, 1.0, epsilon = 1e-9);
    assert_relative_eq!(bbox.max.z, 5.0, epsilon = 1e-9);
}

#[test]
fn test_twisted_extrusion_yields_a_closed_manifold() {
    let eval = Evaluator::new();
    let solid = Shape::square(1.0).extrude(4.0, PI);
    let brep = eval.resolve_shape(&solid).unwrap();
    let Brep::Solid(mesh) = &brep else { panic!() };
    assert!(mesh.is_closed());
    assert!(mesh.is_manifold());
}

#[test]
fn test_picture_frame_extrusion_has_a_through_hole() {
    let eval = Evaluator::new();
    let solid = picture_frame().extrude(2.0, 0.0);
    let brep = eval.resolve_shape(&solid).unwrap();
    let Brep::Solid(mesh) = &brep else { panic!() };

    // frame material
    assert_eq!(
        eval.kernel().classify(mesh, &Point3::new(1.0, 5.0, 1.0)),
        PointState::Inside
    );
    // the cutout goes all the way through
    for z in [0.5, 1.0, 1.5] {
        assert_eq!(
            eval.kernel().classify(mesh, &Point3::new(5.0, 5.0, z)),
            PointState::Outside
        );
    }
}

#[test]
fn test_twisted_picture_frame_keeps_its_hole() {
    let eval = Evaluator::new();
    let solid = picture_frame()
        .translate(-5.0, -5.0, 0.0)
        .extrude(2.0, PI / 4.0);
    let brep = eval.resolve_shape(&solid).unwrap();
    let Brep::Solid(mesh) = &brep else { panic!() };

    assert!(mesh.is_closed());
    // the hole is centered on the twist axis and survives the twist
    assert_eq!(
        eval.kernel().classify(mesh, &Point3::new(0.0, 0.0, 1.0)),
        PointState::Outside
    );
    assert_eq!(
        eval.kernel().classify(mesh, &Point3::new(0.0, 4.2, 1.0)),
        PointState::Inside
    );
}

#[test]
fn test_full_revolution_makes_a_ring() {
    let eval = Evaluator::new();
    let profile = Shape::square(1.0).translate(2.0, 0.0, 0.0);
    let ring = profile.revolve(None);
    let brep = eval.resolve_shape(&ring).unwrap();
    let Brep::Solid(mesh) = &brep else { panic!() };

    assert!(mesh.is_closed());
    assert_eq!(
        eval.kernel().classify(mesh, &Point3::new(2.5, 0.5, 0.0)),
        PointState::Inside
    );
    assert_eq!(
        eval.kernel().classify(mesh, &Point3::new(0.0, 0.5, 0.0)),
        PointState::Outside
    );
}

#[test]
fn test_partial_revolution_is_clamped_to_a_full_turn() {
    let eval = Evaluator::new();
    let profile = Shape::square(1.0).translate(2.0, 0.0, 0.0);

    let over = eval
        .bounding_box(&profile.clone().revolve(Some(3.0 * PI)).into())
        .unwrap();
    let full = eval.bounding_box(&profile.revolve(None).into()).unwrap();
    assert!(over.approx_eq(&full, 1e-9));
}

#[test]
fn test_extruding_a_solid_is_an_argument_error() {
    let eval = Evaluator::new();
    let err = eval
        .resolve_shape(&Shape::cube(1.0).extrude(2.0, 0.0))
        .unwrap_err();
    assert!(err.is_argument());
    assert!(err.to_string().contains("planar"));
}

#[test]
fn test_revolving_a_solid_is_an_argument_error() {
    let eval = Evaluator::new();
    let err = eval
        .resolve_shape(&Shape::sphere(1.0).revolve(None))
        .unwrap_err();
    assert!(err.is_argument());
}
