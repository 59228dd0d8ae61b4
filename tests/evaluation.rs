// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Brepkit Team

//! End-to-end shape resolution

use approx::assert_relative_eq;
use brepkit::kernel::PointState;
use brepkit::{Brep, Evaluator, Shape, Transform, Value};
use nalgebra::{Point3, Vector3};
use std::f64::consts::FRAC_PI_2;
use std::rc::Rc;

#[test]
fn test_resolution_is_idempotent() {
    let eval = Evaluator::new();
    let rendered = eval.resolve_shape(&Shape::cube(2.0)).unwrap();

    // feeding a rendered value back in returns it without further work
    let again = eval.resolve(&Value::Solid(rendered.clone())).unwrap();
    assert!(eval
        .kernel()
        .bounding_box(&again)
        .approx_eq(&eval.kernel().bounding_box(&rendered), 1e-12));

    let wrapped = Shape::Rendered(rendered.clone());
    let through_node = eval.resolve_shape(&wrapped).unwrap();
    assert!(eval
        .kernel()
        .bounding_box(&through_node)
        .approx_eq(&eval.kernel().bounding_box(&rendered), 1e-12));
}

#[test]
fn test_number_resolution_is_an_argument_error_naming_the_value() {
    let eval = Evaluator::new();
    let err = eval.resolve(&Value::Number(42.0)).unwrap_err();
    assert!(err.is_argument());
    let msg = err.to_string();
    assert!(msg.contains("attempt to render"));
    assert!(msg.contains("42"));
}

#[test]
fn test_union_with_zero_volume_box_behaves_as_identity() {
    let eval = Evaluator::new();
    let a = Shape::cuboid(3.0, 2.0, 1.0);
    let empty = Shape::cuboid(0.0, 5.0, 5.0);

    let combined = eval.resolve_shape(&(a.clone() + empty)).unwrap();
    let alone = eval.resolve_shape(&a).unwrap();
    assert!(eval
        .kernel()
        .bounding_box(&combined)
        .approx_eq(&eval.kernel().bounding_box(&alone), 1e-9));

    let Brep::Solid(mesh) = &combined else { panic!() };
    assert_eq!(
        eval.kernel().classify(mesh, &Point3::new(1.5, 1.0, 0.5)),
        PointState::Inside
    );
}

#[test]
fn test_difference_is_order_significant() {
    let eval = Evaluator::new();
    let big = Shape::cube(4.0);
    let small = Shape::cube(2.0).translate(1.0, 1.0, 1.0);

    let carved = eval.resolve_shape(&(big.clone() - small.clone())).unwrap();
    let Brep::Solid(mesh) = &carved else { panic!() };
    assert_eq!(
        eval.kernel().classify(mesh, &Point3::new(2.0, 2.0, 2.0)),
        PointState::Outside
    );

    let nothing_left = eval.resolve_shape(&(small - big)).unwrap();
    let Brep::Solid(mesh) = &nothing_left else { panic!() };
    assert_eq!(
        eval.kernel().classify(mesh, &Point3::new(2.0, 2.0, 2.0)),
        PointState::Outside
    );
    assert_eq!(
        eval.kernel().classify(mesh, &Point3::new(1.5, 1.5, 1.5)),
        PointState::Outside
    );
}

#[test]
fn test_transformed_shape_moves_its_bounding_box() {
    let eval = Evaluator::new();
    let moved = Shape::cube(1.0).translate(10.0, 0.0, 0.0);
    let bbox = eval.bounding_box(&moved.into()).unwrap();
    assert_relative_eq!(bbox.min.x, 10.0, epsilon = 1e-9);
    assert_relative_eq!(bbox.max.x, 11.0, epsilon = 1e-9);
}

#[test]
fn test_rotation_about_z_swings_a_translated_cube() {
    let eval = Evaluator::new();
    // translate then rotate: rotation applies to the moved frame
    let shape = Shape::cube(1.0)
        .translate(5.0, 0.0, 0.0)
        .rotate(FRAC_PI_2, Vector3::z());
    let bbox = eval.bounding_box(&shape.into()).unwrap();
    assert_relative_eq!(bbox.min.y, 5.0, epsilon = 1e-9);
    assert_relative_eq!(bbox.max.x, 0.0, epsilon = 1e-9);
}

#[test]
fn test_mirrored_solid_still_classifies_correctly() {
    let eval = Evaluator::new();
    let shape = Shape::cuboid(2.0, 1.0, 1.0).mirror(1.0, 0.0, 0.0);
    let brep = eval.resolve_shape(&shape).unwrap();
    let Brep::Solid(mesh) = &brep else { panic!() };
    assert_eq!(
        eval.kernel().classify(mesh, &Point3::new(-1.0, 0.5, 0.5)),
        PointState::Inside
    );
    assert_eq!(
        eval.kernel().classify(mesh, &Point3::new(1.0, 0.5, 0.5)),
        PointState::Outside
    );
}

#[test]
fn test_intersection_keeps_the_overlap() {
    let eval = Evaluator::new();
    let a = Shape::cube(2.0);
    let b = Shape::cube(2.0).translate(1.0, 0.0, 0.0);
    let brep = eval.resolve_shape(&(a * b)).unwrap();
    let bbox = eval.kernel().bounding_box(&brep);
    assert_relative_eq!(bbox.min.x, 1.0, epsilon = 1e-9);
    assert_relative_eq!(bbox.max.x, 2.0, epsilon = 1e-9);
}

#[test]
fn test_polyhedron_with_too_few_faces_is_rejected() {
    let eval = Evaluator::new();
    let shape = Shape::polyhedron(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        vec![vec![0, 1, 2]],
    );
    let err = eval.resolve_shape(&shape).unwrap_err();
    assert!(err.is_argument());
}

#[test]
fn test_shared_profile_feeds_two_sweeps() {
    let eval = Evaluator::new();
    let profile = Rc::new(Shape::square(1.0));
    let a = Shape::LinearExtrusion {
        profile: Rc::clone(&profile),
        height: 2.0,
        twist: 0.0,
    };
    let b = Shape::LinearExtrusion {
        profile,
        height: 3.0,
        twist: 0.0,
    };
    assert!(eval.resolve_shape(&a).is_ok());
    assert!(eval.resolve_shape(&b).is_ok());
}

#[test]
fn test_singular_transform_inverse_is_a_kernel_error() {
    let t = Transform::identity().scale(2.0, 0.0, 1.0);
    let err = t.inverse().unwrap_err();
    assert!(err.is_kernel());
}
