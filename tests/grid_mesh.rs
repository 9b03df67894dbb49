//! Integration tests for the grid quad-edge engine: Euler counts, threaded
//! construction, and incremental removal over realistic meshes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use terratri::geometry::predicates::strictly_in_circle;
use terratri::prelude::*;

fn grid_points(w: u32, h: u32) -> Vec<GridPoint> {
    (0..h)
        .flat_map(|r| (0..w).map(move |c| GridPoint::new(c, r)))
        .collect()
}

fn delaunay_holds(mesh: &GridMesh, points: &[GridPoint]) -> bool {
    mesh.triangles().iter().all(|t| {
        points
            .iter()
            .all(|&p| !strictly_in_circle(t[0], t[1], t[2], p))
    })
}

fn random_points(rng: &mut StdRng, n: usize, w: u32, h: u32) -> Vec<GridPoint> {
    let mut pts: Vec<GridPoint> = (0..n)
        .map(|_| GridPoint::new(rng.random_range(0..w), rng.random_range(0..h)))
        .collect();
    pts.sort_unstable();
    pts.dedup();
    pts
}

#[test]
fn full_lattice_matches_the_euler_count() {
    // 5x5 lattice: n = 25, hull = 16, triangles = 2n - 2 - h = 32.
    let pts = grid_points(5, 5);
    let mut mesh = GridMesh::new(5, 5).unwrap();
    mesh.triangulate(&pts).unwrap();

    assert_eq!(mesh.live_points(), 25);
    assert_eq!(mesh.triangles().len(), 32);
    assert!(delaunay_holds(&mesh, &pts));
    mesh.validate().unwrap();
}

#[test]
fn threaded_build_of_a_large_lattice_agrees_with_serial() {
    // 20x15 = 300 points, above the fork cutoff.
    let pts = grid_points(20, 15);
    let expected = 2 * 300 - 2 - (2 * (20 + 15) - 4);

    let mut serial = GridMesh::new(20, 15).unwrap();
    serial.triangulate(&pts).unwrap();
    assert_eq!(serial.triangles().len(), expected);

    let mut threaded = GridMesh::new(20, 15).unwrap();
    threaded.triangulate_threaded(&pts).unwrap();
    assert_eq!(threaded.triangles().len(), expected);
    assert_eq!(threaded.live_points(), serial.live_points());
    assert!(delaunay_holds(&threaded, &pts));
    threaded.validate().unwrap();
}

#[test]
fn threaded_build_of_a_random_cloud_agrees_with_serial() {
    let mut rng = StdRng::seed_from_u64(1234);
    let pts = random_points(&mut rng, 600, 64, 64);
    assert!(pts.len() > 300); // enough survivors to fork

    let mut serial = GridMesh::new(64, 64).unwrap();
    serial.triangulate(&pts).unwrap();
    let mut threaded = GridMesh::new(64, 64).unwrap();
    threaded.triangulate_threaded(&pts).unwrap();

    // Any two Delaunay triangulations of the same set have the same face
    // count, whatever the cocircular tie choices.
    assert_eq!(threaded.triangles().len(), serial.triangles().len());
    assert!(delaunay_holds(&serial, &pts));
    assert!(delaunay_holds(&threaded, &pts));
    serial.validate().unwrap();
    threaded.validate().unwrap();
}

#[test]
fn interior_removal_drops_exactly_two_faces() {
    let pts = grid_points(6, 6);
    let mut mesh = GridMesh::new(6, 6).unwrap();
    mesh.triangulate(&pts).unwrap();
    let before = mesh.triangles().len();

    let p = GridPoint::new(3, 3);
    assert!(mesh.remove_and_retriangulate(p).unwrap());
    let tris = mesh.triangles();
    assert_eq!(tris.len(), before - 2);
    assert!(tris.iter().all(|t| !t.contains(&p)));
    mesh.validate().unwrap();

    let rest: Vec<_> = pts.iter().copied().filter(|&q| q != p).collect();
    assert!(delaunay_holds(&mesh, &rest));
}

#[test]
fn boundary_removal_drops_one_face() {
    // Removing a non-corner hull point straightens the hull by one vertex:
    // n drops by one and h drops by one, so the count drops by one.
    let pts = grid_points(6, 6);
    let mut mesh = GridMesh::new(6, 6).unwrap();
    mesh.triangulate(&pts).unwrap();
    let before = mesh.triangles().len();

    let p = GridPoint::new(3, 0);
    assert!(mesh.remove_and_retriangulate(p).unwrap());
    let tris = mesh.triangles();
    assert_eq!(tris.len(), before - 1);
    assert!(tris.iter().all(|t| !t.contains(&p)));
    mesh.validate().unwrap();
}

#[test]
fn removal_sequence_keeps_the_mesh_consistent() {
    let mut rng = StdRng::seed_from_u64(99);
    let pts = random_points(&mut rng, 80, 32, 32);
    let mut mesh = GridMesh::new(32, 32).unwrap();
    mesh.triangulate(&pts).unwrap();

    let mut alive: Vec<GridPoint> = pts.clone();
    for _ in 0..10 {
        let victim = alive.remove(rng.random_range(0..alive.len()));
        assert!(mesh.remove_and_retriangulate(victim).unwrap());
        assert!(mesh.triangles().iter().all(|t| !t.contains(&victim)));
        assert_eq!(mesh.live_points(), alive.len());
        mesh.validate().unwrap();
        assert!(delaunay_holds(&mesh, &alive));
    }
}

#[test]
fn plain_removal_then_rebuild_recovers_the_count() {
    let pts = grid_points(4, 4);
    let mut mesh = GridMesh::new(4, 4).unwrap();
    mesh.triangulate(&pts).unwrap();

    // Detach without refilling: the hole faces disappear.
    let p = GridPoint::new(1, 1);
    assert!(mesh.remove_point(p).unwrap());
    mesh.validate().unwrap();

    // A fresh build over the remaining points restores a full triangulation.
    let rest: Vec<_> = pts.iter().copied().filter(|&q| q != p).collect();
    mesh.triangulate(&rest).unwrap();
    // n = 15, h = 12: 2n - 2 - h = 16.
    assert_eq!(mesh.triangles().len(), 16);
    assert!(delaunay_holds(&mesh, &rest));
    mesh.validate().unwrap();
}

#[test]
fn ignored_cells_stay_addressable() {
    let pts = grid_points(3, 3);
    let mut mesh = GridMesh::new(3, 3).unwrap();
    mesh.triangulate(&pts).unwrap();

    let p = GridPoint::new(1, 1);
    assert!(mesh.remove_and_retriangulate(p).unwrap());
    assert!(!mesh.is_live(p));
    // Removing again is a clean no-op, not an error.
    assert!(!mesh.remove_and_retriangulate(p).unwrap());
    assert!(!mesh.remove_point(p).unwrap());
}
