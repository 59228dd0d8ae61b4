// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Brepkit Team

//! STL export and re-import

use anyhow::Result;
use brepkit::{Brep, Evaluator, Shape, Value};
use std::rc::Rc;

#[test]
fn test_export_then_import_preserves_extent() -> Result<()> {
    let eval = Evaluator::new();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("part.stl");

    let part = Shape::cuboid(3.0, 2.0, 1.0) + Shape::cylinder(1.0, 4.0).translate(1.5, 1.0, 0.0);
    let original = eval.bounding_box(&part.clone().into())?;

    eval.write_stl(&part.into(), &path)?;
    let imported = eval.import_stl(&path)?;

    let reloaded = eval.bounding_box(&Value::Shape(Rc::new(imported.clone())))?;
    assert!(reloaded.approx_eq(&original, 1e-4));

    // the import is terminal: it resolves without kernel work
    let Brep::Solid(mesh) = eval.resolve_shape(&imported)? else {
        panic!()
    };
    assert!(!mesh.is_empty());
    Ok(())
}

#[test]
fn test_lazy_import_node_reads_at_render_time() -> Result<()> {
    let eval = Evaluator::new();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("lazy.stl");

    eval.write_stl(&Shape::cube(2.0).into(), &path)?;

    // building the node does not touch the file; rendering does
    let lazy = Shape::import(&path);
    let bbox = eval.bounding_box(&lazy.clone().into())?;
    assert!((bbox.max.x - 2.0).abs() < 1e-4);

    std::fs::remove_file(&path)?;
    assert!(eval.resolve_shape(&lazy).is_err());
    Ok(())
}

#[test]
fn test_exporting_a_sheet_is_a_kernel_error() {
    let eval = Evaluator::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flat.stl");

    let err = eval
        .write_stl(&Shape::circle(2.0).into(), &path)
        .unwrap_err();
    assert!(err.is_kernel());
}

#[test]
fn test_importing_a_missing_file_fails() {
    let eval = Evaluator::new();
    let err = eval
        .import_stl(std::path::Path::new("/nonexistent/part.stl"))
        .unwrap_err();
    assert!(err.is_kernel());
}
