// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Brepkit Team

//! Convex-hull facet enumeration
//!
//! Exhaustive supporting-plane search: every plane through three input
//! points that keeps the whole cloud on one side contributes a facet, and
//! the facet's vertex set is the extreme points of everything coplanar
//! with it. Facets come back as unordered vertex sets; winding them into
//! oriented faces is the caller's job.
//!
//! The enumerator is a global single-instance resource with explicit
//! teardown: runs serialize on a process-wide lock, every facet
//! allocation is tracked, and [`FacetEnumerator::free`] verifies the
//! accounting drains to zero.

use crate::error::{Error, Result};
use nalgebra::{Point2, Point3, Vector3};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

static OUTSTANDING_BLOCKS: AtomicUsize = AtomicUsize::new(0);
static RUN_LOCK: Mutex<()> = Mutex::new(());

fn acquire_run_lock() -> MutexGuard<'static, ()> {
    RUN_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One hull facet: the facet's vertices in no particular order.
#[derive(Debug, Clone)]
pub struct HullFacet {
    pub vertices: Vec<Point3<f64>>,
}

/// A completed enumeration run holding its facet allocations until freed.
/// The run lock is held for the lifetime of the value.
#[derive(Debug)]
pub struct FacetEnumerator {
    facets: Vec<HullFacet>,
    freed: bool,
    _run: MutexGuard<'static, ()>,
}

impl FacetEnumerator {
    /// Enumerate the hull facets of a point cloud. Fails with an argument
    /// error for fewer than 4 distinct points and a kernel error when the
    /// cloud is degenerate (all points coplanar). On failure all internal
    /// allocations are released before returning.
    pub fn run(points: &[Point3<f64>]) -> Result<Self> {
        let run = acquire_run_lock();
        let facets = Self::enumerate(points)?;
        debug!(facets = facets.len(), "hull enumeration complete");
        Ok(Self {
            facets,
            freed: false,
            _run: run,
        })
    }

    pub fn facets(&self) -> &[HullFacet] {
        &self.facets
    }

    /// Release the run's allocations and verify the accounting is empty.
    pub fn free(mut self) -> Result<()> {
        self.release();
        if OUTSTANDING_BLOCKS.load(Ordering::SeqCst) != 0 {
            return Err(Error::kernel(
                "hull enumerator reports outstanding allocations after teardown",
            ));
        }
        Ok(())
    }

    /// Wait for any run in flight and report whether the allocation
    /// accounting is empty. A live run holds the run lock until it is
    /// freed or dropped, so calling this while holding one deadlocks;
    /// release the run first.
    pub fn quiescent() -> bool {
        let _run = acquire_run_lock();
        OUTSTANDING_BLOCKS.load(Ordering::SeqCst) == 0
    }

    fn release(&mut self) {
        if !self.freed {
            OUTSTANDING_BLOCKS.fetch_sub(self.facets.len(), Ordering::SeqCst);
            self.facets.clear();
            self.freed = true;
        }
    }

    fn enumerate(points: &[Point3<f64>]) -> Result<Vec<HullFacet>> {
        let distinct = distinct_points(points);
        if distinct.len() < 4 {
            return Err(Error::argument(
                "hull enumeration needs at least 4 distinct points",
            ));
        }

        let extent = extent_of(&distinct);
        let eps = (extent * 1e-9).max(1e-12);

        let n = distinct.len();
        let mut seen: HashSet<Vec<usize>> = HashSet::new();
        let mut facets = Vec::new();

        for i in 0..n {
            for j in (i + 1)..n {
                for k in (j + 1)..n {
                    let normal =
                        (distinct[j] - distinct[i]).cross(&(distinct[k] - distinct[i]));
                    if normal.norm() < eps {
                        continue;
                    }
                    let normal = normal.normalize();
                    let offset = normal.dot(&distinct[i].coords);

                    let mut above = false;
                    let mut below = false;
                    let mut coplanar = Vec::new();
                    for (idx, p) in distinct.iter().enumerate() {
                        let d = normal.dot(&p.coords) - offset;
                        if d > eps {
                            above = true;
                        } else if d < -eps {
                            below = true;
                        } else {
                            coplanar.push(idx);
                        }
                        if above && below {
                            break;
                        }
                    }
                    if above && below {
                        continue;
                    }

                    let mut extreme = extreme_of_coplanar(&distinct, &coplanar, &normal);
                    extreme.sort_unstable();
                    if seen.insert(extreme.clone()) {
                        OUTSTANDING_BLOCKS.fetch_add(1, Ordering::SeqCst);
                        facets.push(HullFacet {
                            vertices: extreme.iter().map(|&idx| distinct[idx]).collect(),
                        });
                    }
                }
            }
        }

        if facets.len() < 4 {
            // flat or degenerate cloud; drain the accounting before the
            // error surfaces
            OUTSTANDING_BLOCKS.fetch_sub(facets.len(), Ordering::SeqCst);
            return Err(Error::kernel("hull enumeration found no closed facet set"));
        }
        Ok(facets)
    }
}

impl Drop for FacetEnumerator {
    fn drop(&mut self) {
        self.release();
    }
}

fn distinct_points(points: &[Point3<f64>]) -> Vec<Point3<f64>> {
    let mut seen: HashSet<[u64; 3]> = HashSet::new();
    let mut out = Vec::new();
    for p in points {
        let norm = |v: f64| if v == 0.0 { 0.0f64 } else { v };
        if seen.insert([norm(p.x).to_bits(), norm(p.y).to_bits(), norm(p.z).to_bits()]) {
            out.push(*p);
        }
    }
    out
}

fn extent_of(points: &[Point3<f64>]) -> f64 {
    let mut min = points[0];
    let mut max = points[0];
    for p in points {
        min = Point3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
        max = Point3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
    }
    (max - min).norm().max(1.0)
}

/// Keep only the extreme points of a coplanar set: project into the plane
/// and take the 2D convex hull (monotone chain).
fn extreme_of_coplanar(
    points: &[Point3<f64>],
    coplanar: &[usize],
    normal: &Vector3<f64>,
) -> Vec<usize> {
    if coplanar.len() <= 3 {
        return coplanar.to_vec();
    }

    let u = if normal.x.abs() < 0.9 {
        Vector3::x().cross(normal).normalize()
    } else {
        Vector3::y().cross(normal).normalize()
    };
    let v = normal.cross(&u);
    let origin = points[coplanar[0]];

    let mut flat: Vec<(Point2<f64>, usize)> = coplanar
        .iter()
        .map(|&idx| {
            let d = points[idx] - origin;
            (Point2::new(d.dot(&u), d.dot(&v)), idx)
        })
        .collect();
    flat.sort_by(|a, b| {
        a.0.x
            .partial_cmp(&b.0.x)
            .unwrap()
            .then(a.0.y.partial_cmp(&b.0.y).unwrap())
    });

    let cross = |o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>| {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    };
    let extend_chain = |chain: &mut Vec<(Point2<f64>, usize)>, p: &(Point2<f64>, usize)| {
        while chain.len() >= 2 && cross(&chain[chain.len() - 2].0, &chain[chain.len() - 1].0, &p.0) <= 0.0 {
            chain.pop();
        }
        chain.push(*p);
    };

    let mut lower: Vec<(Point2<f64>, usize)> = Vec::new();
    for p in &flat {
        extend_chain(&mut lower, p);
    }
    let mut upper: Vec<(Point2<f64>, usize)> = Vec::new();
    for p in flat.iter().rev() {
        extend_chain(&mut upper, p);
    }

    // each chain repeats the other's first point at its end
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower.into_iter().map(|(_, idx)| idx).collect()
}
