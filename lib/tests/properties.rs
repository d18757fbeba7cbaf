//! Property and end-to-end scenario tests for the public triangulation API.
//!
//! These exercise what's reachable from outside the crate: half-edge and
//! priority-queue invariants are covered by the `#[cfg(test)]` modules next
//! to their implementations, where the internal state is visible.

use delatin::{triangulate, Error, Triangulation, TriangulationError};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_grid(width: usize, height: usize, seed: u64, max_value: u32) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..width * height)
        .map(|_| rng.gen_range(0..=max_value) as f64)
        .collect()
}

fn twice_signed_area(a: (usize, usize), b: (usize, usize), c: (usize, usize)) -> f64 {
    let (ax, ay) = (a.0 as f64, a.1 as f64);
    let (bx, by) = (b.0 as f64, b.1 as f64);
    let (cx, cy) = (c.0 as f64, c.1 as f64);
    (bx - cx) * (ay - cy) - (by - cy) * (ax - cx)
}

fn in_circumcircle(p: (usize, usize), a: (usize, usize), b: (usize, usize), c: (usize, usize)) -> bool {
    let (ax, ay) = (a.0 as f64 - p.0 as f64, a.1 as f64 - p.1 as f64);
    let (bx, by) = (b.0 as f64 - p.0 as f64, b.1 as f64 - p.1 as f64);
    let (cx, cy) = (c.0 as f64 - p.0 as f64, c.1 as f64 - p.1 as f64);

    let a2 = ax * ax + ay * ay;
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;

    let det = ax * (by * c2 - b2 * cy) - ay * (bx * c2 - b2 * cx) + a2 * (bx * cy - by * cx);
    det < -1e-6
}

// property 2, 8: every triangle is non-degenerate and its vertices lie
// within the grid rectangle.
proptest! {
    #[test]
    fn triangles_are_non_degenerate_and_within_bounds(
        width in 2usize..8,
        height in 2usize..8,
        seed in any::<u64>(),
    ) {
        let data = random_grid(width, height, seed, 50);
        let mut triangulation = Triangulation::new(&data, width, height).unwrap();
        triangulation.run(Error(3.0)).unwrap();

        let coords = triangulation.coords();
        for &(x, y) in coords {
            prop_assert!(x < width);
            prop_assert!(y < height);
        }

        for &(a, b, c) in &triangulation.triangle_indices() {
            let area = twice_signed_area(coords[a], coords[b], coords[c]);
            prop_assert!(area > 0.0);
        }
    }

    // property 6: run(E) always leaves getMaxError() <= E.
    #[test]
    fn run_converges_below_requested_threshold(
        width in 2usize..8,
        height in 2usize..8,
        seed in any::<u64>(),
        threshold in 0.0f64..20.0,
    ) {
        let data = random_grid(width, height, seed, 100);
        let mut triangulation = Triangulation::new(&data, width, height).unwrap();
        triangulation.run(Error(threshold)).unwrap();
        prop_assert!(triangulation.get_max_error() <= Error(threshold));
    }

    // property 10: running again with the same threshold changes nothing.
    #[test]
    fn run_is_idempotent_under_repetition(
        width in 2usize..8,
        height in 2usize..8,
        seed in any::<u64>(),
        threshold in 0.0f64..20.0,
    ) {
        let data = random_grid(width, height, seed, 100);
        let mut triangulation = Triangulation::new(&data, width, height).unwrap();
        triangulation.run(Error(threshold)).unwrap();

        let vertices_before = triangulation.coords().to_vec();
        let triangles_before = triangulation.triangles().to_vec();
        let error_before = triangulation.get_max_error();
        let rmsd_before = triangulation.get_rmsd();

        triangulation.run(Error(threshold)).unwrap();

        prop_assert_eq!(triangulation.coords().to_vec(), vertices_before);
        prop_assert_eq!(triangulation.triangles().to_vec(), triangles_before);
        prop_assert_eq!(triangulation.get_max_error(), error_before);
        prop_assert_eq!(triangulation.get_rmsd(), rmsd_before);
    }

    // property 9: Delaunay - no vertex lies strictly inside another triangle's
    // circumcircle (checked by brute force over all vertex/triangle pairs,
    // which is fine at the small grid sizes used here).
    #[test]
    fn mesh_is_delaunay(
        width in 2usize..6,
        height in 2usize..6,
        seed in any::<u64>(),
    ) {
        let data = random_grid(width, height, seed, 30);
        let mut triangulation = Triangulation::new(&data, width, height).unwrap();
        triangulation.run(Error(1.0)).unwrap();

        let coords = triangulation.coords();
        let triangles = triangulation.triangle_indices();
        for &(a, b, c) in &triangles {
            for (i, &p) in coords.iter().enumerate() {
                if i == a || i == b || i == c {
                    continue;
                }
                prop_assert!(!in_circumcircle(p, coords[a], coords[b], coords[c]));
            }
        }
    }
}

// S1
#[test]
fn flat_2x2_grid_needs_no_refinement() {
    let data = vec![0.0, 0.0, 0.0, 0.0];
    let mut triangulation = Triangulation::new(&data, 2, 2).unwrap();
    assert_eq!(triangulation.coords().len(), 4);
    assert_eq!(triangulation.triangles().len() / 3, 2);
    assert_eq!(triangulation.get_max_error(), Error(0.0));
    assert_eq!(triangulation.get_rmsd(), 0.0);

    triangulation.run(Error(0.0)).unwrap();
    assert_eq!(triangulation.coords().len(), 4);
    assert_eq!(triangulation.triangles().len() / 3, 2);
}

// S2
#[test]
fn single_spike_introduces_its_vertex_and_converges() {
    let width = 3;
    let height = 3;
    let mut data = vec![0.0; width * height];
    data[1 * width + 1] = 10.0;

    let mut triangulation = Triangulation::new(&data, width, height).unwrap();
    triangulation.run(Error(1.0)).unwrap();

    assert!(triangulation.get_max_error() <= Error(1.0));
    assert!(triangulation.coords().contains(&(1, 1)));
    assert_eq!(triangulation.triangles().len() / 3, 6);
}

// S3
#[test]
fn planar_ramp_needs_no_interior_vertices() {
    let width = 5;
    let height = 5;
    let mut data = Vec::with_capacity(width * height);
    for _y in 0..height {
        for x in 0..width {
            data.push(x as f64);
        }
    }

    let mut triangulation = Triangulation::new(&data, width, height).unwrap();
    assert_eq!(triangulation.get_max_error(), Error(0.0));
    triangulation.run(Error(0.0)).unwrap();
    assert_eq!(triangulation.coords().len(), 4);
}

// S4
#[test]
fn random_grid_bounds_both_max_error_and_rmsd() {
    let width = 5;
    let height = 5;
    let data = random_grid(width, height, 42, 255);

    let mut triangulation = Triangulation::new(&data, width, height).unwrap();
    triangulation.run(Error(5.0)).unwrap();
    assert!(triangulation.get_max_error() <= Error(5.0));
    assert!(triangulation.get_rmsd() >= 0.0);
}

// S5
#[test]
fn all_zeros_grid_starts_converged() {
    let data = vec![0.0; 16];
    let triangulation = Triangulation::new(&data, 4, 4).unwrap();
    assert_eq!(triangulation.get_max_error(), Error(0.0));
}

// S7
#[test]
fn mismatched_data_length_is_rejected_before_any_refinement() {
    let data = vec![0.0; 3];
    let err = Triangulation::new(&data, 2, 2).unwrap_err();
    assert!(matches!(
        err,
        TriangulationError::InvalidDataLength {
            expected: 4,
            actual: 3
        }
    ));
}

// S8
#[test]
fn undersized_dimensions_are_rejected() {
    let data = vec![0.0; 2];
    let err = Triangulation::new(&data, 1, 2).unwrap_err();
    assert!(matches!(
        err,
        TriangulationError::InvalidDimensions {
            width: 1,
            height: 2
        }
    ));
}

// S9
#[test]
fn negative_or_non_finite_max_error_is_rejected_without_mutation() {
    let data = vec![0.0; 4];
    let mut triangulation = Triangulation::new(&data, 2, 2).unwrap();

    for bad in [-1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = triangulation.run(Error(bad)).unwrap_err();
        assert!(matches!(err, TriangulationError::InvalidMaxError(_)));
    }

    assert_eq!(triangulation.coords().len(), 4);
}

#[test]
fn triangulate_convenience_wrapper_matches_stateful_handle() {
    let width = 5;
    let height = 5;
    let data = random_grid(width, height, 7, 200);

    let (points, triangles) = triangulate(&data, width, height, Error(3.0)).unwrap();

    let mut triangulation = Triangulation::new(&data, width, height).unwrap();
    triangulation.run(Error(3.0)).unwrap();

    assert_eq!(points, triangulation.coords());
    assert_eq!(triangles, triangulation.triangle_indices());
}
