//! Integration tests for the sweep-line engine.
//!
//! Deterministic known configurations plus a seeded random cloud checked
//! against the planar Euler count (`2n - 2 - h` triangles for `n` sites with
//! `h` on the convex hull) and a brute-force empty-circumcircle test.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use terratri::prelude::*;

fn sorted(mut pts: Vec<Point>) -> Vec<Point> {
    pts.sort_by(Point::cmp_yx);
    pts
}

/// Convex hull vertex count via a monotone chain; collinear hull points are
/// not expected in the random clouds this is applied to.
fn hull_size(pts: &[Point]) -> usize {
    let mut s: Vec<(f64, f64)> = pts.iter().map(|p| (p.x, p.y)).collect();
    s.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let cross = |o: (f64, f64), a: (f64, f64), b: (f64, f64)| {
        (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
    };
    let mut hull: Vec<(f64, f64)> = Vec::new();
    for pass in 0..2 {
        let start = hull.len();
        let iter: Box<dyn Iterator<Item = &(f64, f64)>> = if pass == 0 {
            Box::new(s.iter())
        } else {
            Box::new(s.iter().rev())
        };
        for &p in iter {
            while hull.len() > start + 1
                && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
            {
                hull.pop();
            }
            hull.push(p);
        }
        hull.pop(); // the chain's endpoint repeats in the other pass
    }
    hull.len()
}

/// Brute-force empty-circumcircle check with a small relative tolerance.
fn is_delaunay(pts: &[Point], tris: &[Triangle]) -> bool {
    tris.iter().all(|t| {
        let (a, b, c) = (
            &pts[t[0] as usize],
            &pts[t[1] as usize],
            &pts[t[2] as usize],
        );
        let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
        if d.abs() < f64::EPSILON {
            return false; // degenerate triangle emitted
        }
        let (a2, b2, c2) = (
            a.x * a.x + a.y * a.y,
            b.x * b.x + b.y * b.y,
            c.x * c.x + c.y * c.y,
        );
        let ux = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
        let uy = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;
        let center = Point::new(ux, uy);
        let r = center.dist(a);
        let margin = 1e-9 * (1.0 + r);
        pts.iter().all(|p| center.dist(p) >= r - margin)
    })
}

#[test]
fn square_with_center_fans_around_it() {
    let pts = sorted(vec![
        Point::new(0.0, 0.0),
        Point::new(2.0, 0.0),
        Point::new(0.0, 2.0),
        Point::new(2.0, 2.0),
        Point::new(1.0, 1.0),
    ]);
    let center = pts
        .iter()
        .position(|p| p.x == 1.0 && p.y == 1.0)
        .unwrap() as u32;

    let tris = triangulate(&pts).unwrap();
    // n = 5, hull = 4: 2n - 2 - h = 4, all incident to the center.
    assert_eq!(tris.len(), 4);
    assert!(tris.iter().all(|t| t.contains(&center)));
    assert!(is_delaunay(&pts, &tris));
}

#[test]
fn random_cloud_matches_euler_count_and_is_delaunay() {
    let mut rng = StdRng::seed_from_u64(42);
    let pts = sorted(
        (0..40)
            .map(|_| Point::new(rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)))
            .collect(),
    );

    let tris = triangulate(&pts).unwrap();
    let expected = 2 * pts.len() - 2 - hull_size(&pts);
    assert_eq!(tris.len(), expected);
    assert!(is_delaunay(&pts, &tris));

    for t in &tris {
        assert!(t.iter().all(|&i| (i as usize) < pts.len()));
        assert_ne!(t[0], t[1]);
        assert_ne!(t[1], t[2]);
        assert_ne!(t[0], t[2]);
    }
}

#[test]
fn output_is_identical_across_runs() {
    let mut rng = StdRng::seed_from_u64(7);
    let pts = sorted(
        (0..25)
            .map(|_| Point::new(rng.random_range(-50.0..50.0), rng.random_range(-50.0..50.0)))
            .collect(),
    );
    let first = triangulate(&pts).unwrap();
    for _ in 0..5 {
        assert_eq!(triangulate(&pts).unwrap(), first);
    }
}

#[test]
fn colinear_cloud_produces_no_triangles() {
    let pts: Vec<Point> = (0..5).map(|i| Point::new(f64::from(i), f64::from(i))).collect();
    assert!(triangulate(&pts).unwrap().is_empty());
}

#[test]
fn elevation_passes_through_untouched() {
    // Indices refer to the caller's slice, so the z channel never matters.
    let flat = vec![
        Point::new(0.0, 0.0),
        Point::new(3.0, 0.0),
        Point::new(1.0, 2.0),
        Point::new(2.0, 3.0),
    ];
    let lifted: Vec<Point> = flat
        .iter()
        .enumerate()
        .map(|(i, p)| Point::with_z(p.x, p.y, 1000.0 + i as f64))
        .collect();
    assert_eq!(triangulate(&flat).unwrap(), triangulate(&lifted).unwrap());
}

#[test]
fn unsorted_input_reports_the_break_index() {
    let pts = vec![
        Point::new(0.0, 0.0),
        Point::new(5.0, 1.0),
        Point::new(4.0, 1.0), // ties on y must ascend in x
        Point::new(0.0, 2.0),
    ];
    assert_eq!(
        triangulate(&pts).unwrap_err(),
        SweepError::UnsortedInput { index: 2 }
    );
}

#[test]
fn staged_context_appends_across_run() {
    let pts = sorted(vec![
        Point::new(0.0, 0.0),
        Point::new(2.0, 0.0),
        Point::new(1.0, 1.5),
        Point::new(3.0, 2.0),
    ]);
    let mut cx = SweepContext::new(&pts).unwrap();
    let mut out = vec![[9, 9, 9]]; // pre-existing content is preserved
    cx.run(&mut out).unwrap();
    assert_eq!(out[0], [9, 9, 9]);
    assert_eq!(out.len(), 1 + triangulate(&pts).unwrap().len());
}
