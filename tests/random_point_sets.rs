//! Seeded random point sets of increasing size, in `f64` and `f32`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tetra_delaunay::prelude::*;

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

fn random_points_f64(count: usize, seed: u64) -> Vec<Point<f64, 3>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            Point::new([
                rng.random_range(-10.0..10.0),
                rng.random_range(-10.0..10.0),
                rng.random_range(-10.0..10.0),
            ])
        })
        .collect()
}

fn random_points_f32(count: usize, seed: u64) -> Vec<Point<f32, 3>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            Point::new([
                rng.random_range(-1.0_f32..1.0),
                rng.random_range(-1.0_f32..1.0),
                rng.random_range(-1.0_f32..1.0),
            ])
        })
        .collect()
}

/// Points on the unit sphere: every tetrahedron is nearly cospherical with
/// its neighbors.
fn sphere_points(count: usize, seed: u64) -> Vec<Point<f64, 3>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let z: f64 = rng.random_range(-1.0..1.0);
            let phi: f64 = rng.random_range(0.0..std::f64::consts::TAU);
            let r = (1.0 - z * z).sqrt();
            Point::new([r * phi.cos(), r * phi.sin(), z])
        })
        .collect()
}

macro_rules! random_set_test {
    ($name:ident, $points:expr) => {
        pastey::paste! {
            #[test]
            fn [<random_set_ $name>]() {
                init_tracing();
                let points = $points;
                let mut delaunay = Delaunay3::new();
                assert_eq!(delaunay.tetrahedralize(&points), Ok(true));
                assert_eq!(delaunay.number_of_unique_vertices(), points.len());
                assert_eq!(delaunay.validate_delaunay(), Ok(()));
                assert_eq!(delaunay.validate_adjacencies(), Ok(()));
                assert_eq!(delaunay.validate_hull(), Ok(()));
                assert!(delaunay.mesh().validate_neighbors().is_ok());

                let stats = delaunay.predicate_statistics();
                assert!(stats.plane_queries > 0);
                assert!(stats.sphere_queries > 0);
                assert!(stats.plane_exact <= stats.plane_queries);
                assert!(stats.sphere_exact <= stats.sphere_queries);
            }
        }
    };
}

random_set_test!(f64_50, random_points_f64(50, 7));
random_set_test!(f64_200, random_points_f64(200, 42));
random_set_test!(f32_100, random_points_f32(100, 1234));
random_set_test!(sphere_120, sphere_points(120, 99));

#[test]
fn all_random_queries_are_located_correctly() {
    init_tracing();
    let points = random_points_f64(80, 2024);
    let mut delaunay = Delaunay3::new();
    assert_eq!(delaunay.tetrahedralize(&points), Ok(true));

    let mut rng = StdRng::seed_from_u64(5);
    let mut search = SearchInfo::default();
    let mut inside = 0;
    for _ in 0..200 {
        let query = Point::new([
            rng.random_range(-12.0..12.0),
            rng.random_range(-12.0..12.0),
            rng.random_range(-12.0..12.0),
        ]);
        let found = delaunay.containing_tetrahedron(&query, &mut search).unwrap();

        // Brute force: which tetrahedra contain the query?
        let containing: Vec<usize> = (0..delaunay.number_of_tetrahedra())
            .filter(|&t| {
                let [v0, v1, v2, v3] = delaunay.tetrahedron_indices(t).unwrap().map(|i| &points[i]);
                to_plane(&query, v1, v2, v3) <= 0
                    && to_plane(&query, v0, v3, v2) <= 0
                    && to_plane(&query, v0, v1, v3) <= 0
                    && to_plane(&query, v0, v2, v1) <= 0
            })
            .collect();
        match found {
            Some(t) => {
                inside += 1;
                assert!(containing.contains(&t));
            }
            None => assert!(containing.is_empty()),
        }
        if let Some(t) = found {
            search.initial_tetrahedron = t;
        }
    }
    assert!(inside > 0);
}

#[test]
fn cold_and_warm_start_agree() {
    init_tracing();
    let points = random_points_f64(150, 77);
    let cold_config = Delaunay3ConfigBuilder::default()
        .warm_start(false)
        .build()
        .unwrap();

    let mut warm = Delaunay3::new();
    let mut cold = Delaunay3::with_config(cold_config);
    assert_eq!(warm.tetrahedralize(&points), Ok(true));
    assert_eq!(cold.tetrahedralize(&points), Ok(true));
    assert_eq!(warm.number_of_tetrahedra(), cold.number_of_tetrahedra());
    assert_eq!(warm.hull().map(|h| h.len()), cold.hull().map(|h| h.len()));
    assert_eq!(cold.validate_delaunay(), Ok(()));
}

#[cfg(feature = "slow-tests")]
#[test]
fn random_set_f64_2000() {
    init_tracing();
    let points = random_points_f64(2000, 31_337);
    let mut delaunay = Delaunay3::new();
    assert_eq!(delaunay.tetrahedralize(&points), Ok(true));
    assert_eq!(delaunay.validate_adjacencies(), Ok(()));
    assert_eq!(delaunay.validate_delaunay(), Ok(()));
}
