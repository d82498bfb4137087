//! Integration tests for dynamic hull maintenance
//!
//! The dynamic structure is checked against a static monotone-chain hull
//! recomputed from scratch after every update.

use math_dynamic_hull::{
    DynamicConvexHull, DynamicHullError, HullConfig, Point, merge_chains, testdata, tree_to_dot,
};
use rand::Rng;
use rand::seq::SliceRandom;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn coords(points: &[Point]) -> Vec<(f64, f64)> {
    points.iter().map(|p| (p.x, p.y)).collect()
}

/// Compare all three views of the hull against the static reference
fn assert_matches_reference(hull: &DynamicConvexHull, points: &[Point]) {
    assert_eq!(
        hull.upper_chain().unwrap(),
        testdata::upper_chain_reference(points),
        "Upper chain differs for {} points",
        points.len()
    );
    assert_eq!(
        hull.lower_chain().unwrap(),
        testdata::lower_chain_reference(points),
        "Lower chain differs for {} points",
        points.len()
    );
    assert_eq!(
        hull.boundary().unwrap(),
        testdata::monotone_chain_hull(points),
        "Boundary differs for {} points",
        points.len()
    );
}

#[test]
fn test_random_disk_against_reference() {
    init_logging();
    let mut rng = rand::rng();
    for _ in 0..40 {
        let n = rng.random_range(3..=200);
        let points = testdata::random_disk_points(n, 10.0);
        let hull = DynamicConvexHull::from_points(points.iter().copied()).unwrap();
        assert_eq!(hull.len(), n);
        assert_matches_reference(&hull, &points);
    }
}

#[test]
fn test_random_grid_updates_against_reference() {
    init_logging();
    let mut rng = rand::rng();
    for half_extent in [2, 4, 8, 50] {
        let mut hull = DynamicConvexHull::with_config(HullConfig::validating());
        let mut stored: Vec<Point> = Vec::new();

        for _ in 0..300 {
            if !stored.is_empty() && rng.random_bool(0.4) {
                let index = rng.random_range(0..stored.len());
                let victim = stored.swap_remove(index);
                let removed = hull.delete(&victim).unwrap();
                assert_eq!(removed.id, victim.id);
            } else {
                let p = Point::new(
                    rng.random_range(-half_extent..=half_extent) as f64,
                    rng.random_range(-half_extent..=half_extent) as f64,
                );
                match hull.insert(p) {
                    Ok(()) => stored.push(p),
                    Err(DynamicHullError::DuplicatePoint { .. }) => {
                        assert!(stored.contains(&p));
                    }
                    Err(err) => panic!("Insert of {} failed: {}", p, err),
                }
            }

            assert_eq!(hull.len(), stored.len());
            if stored.is_empty() {
                assert!(matches!(
                    hull.boundary(),
                    Err(DynamicHullError::EmptyStructure)
                ));
            } else {
                assert_matches_reference(&hull, &stored);
            }
        }
    }
}

#[test]
fn test_insert_delete_is_inverse() {
    let points = testdata::random_grid_points(60, 20);
    let mut hull = DynamicConvexHull::from_points(points.iter().copied()).unwrap();
    let upper = hull.upper_chain().unwrap();
    let lower = hull.lower_chain().unwrap();

    for p in testdata::random_grid_points(30, 25) {
        if hull.contains(&p) {
            continue;
        }
        hull.insert(p).unwrap();
        hull.delete(&p).unwrap();
        assert_eq!(hull.upper_chain().unwrap(), upper);
        assert_eq!(hull.lower_chain().unwrap(), lower);
    }
    hull.validate().unwrap();
}

#[test]
fn test_duplicate_rejection_keeps_structure() {
    let points = testdata::random_disk_points(50, 1.0);
    let mut hull = DynamicConvexHull::from_points(points.iter().copied()).unwrap();
    let boundary = hull.boundary().unwrap();

    for p in points.iter().take(10) {
        let copy = Point::new(p.x, p.y);
        let err = hull.insert(copy).unwrap_err();
        assert!(matches!(err, DynamicHullError::DuplicatePoint { .. }));
    }
    assert_eq!(hull.len(), 50);
    assert_eq!(hull.boundary().unwrap(), boundary);
    hull.validate().unwrap();
}

/// Visit every permutation of `items` (Heap's algorithm)
fn for_each_permutation<T: Clone>(items: &mut [T], visit: &mut impl FnMut(&[T])) {
    fn permute<T: Clone>(k: usize, items: &mut [T], visit: &mut impl FnMut(&[T])) {
        if k <= 1 {
            visit(items);
            return;
        }
        for i in 0..k - 1 {
            permute(k - 1, items, visit);
            if k % 2 == 0 {
                items.swap(i, k - 1);
            } else {
                items.swap(0, k - 1);
            }
        }
        permute(k - 1, items, visit);
    }
    let n = items.len();
    permute(n, items, visit);
}

#[test]
fn test_lab_points_in_every_order() {
    let mut points = testdata::lab_points();
    let expected = vec![(-5.0, -3.0), (6.0, 10.0), (7.0, 7.0), (-1.0, -1.0)];
    let mut orders = 0;

    for_each_permutation(&mut points, &mut |order: &[Point]| {
        let hull = DynamicConvexHull::from_points(order.iter().copied()).unwrap();
        let boundary = hull.boundary().unwrap();
        assert_eq!(coords(&boundary), expected);
        assert!(!boundary.contains(&Point::new(0.0, 0.0)));
        assert!(!boundary.contains(&Point::new(3.0, 6.0)));
        orders += 1;
    });

    assert_eq!(orders, 720);
}

#[test]
fn test_failed_updates_leave_hull_unchanged() {
    init_logging();
    let config = HullConfig {
        bridge_iteration_factor: 0,
        ..HullConfig::default()
    };
    let mut hull = DynamicConvexHull::with_config(config);
    let mut rng = rand::rng();
    let mut spare = testdata::circle_points(512, 1000.0);
    spare.shuffle(&mut rng);
    let mut stored: Vec<Point> = Vec::new();
    let mut failures = 0;

    for _ in 0..3000 {
        let upper = hull.upper_chain().ok();
        let lower = hull.lower_chain().ok();
        let len = hull.len();

        let delete = spare.is_empty() || (!stored.is_empty() && rng.random_bool(0.4));
        let result = if delete {
            let index = rng.random_range(0..stored.len());
            let victim = stored[index];
            hull.delete(&victim).map(|_| {
                stored.swap_remove(index);
                spare.push(victim);
            })
        } else {
            let index = rng.random_range(0..spare.len());
            let p = spare[index];
            hull.insert(p).map(|()| {
                spare.swap_remove(index);
                stored.push(p);
            })
        };

        match result {
            Ok(()) => assert_eq!(hull.len(), stored.len()),
            Err(err) => {
                failures += 1;
                assert!(
                    matches!(err, DynamicHullError::DegenerateBridge { .. }),
                    "Unexpected error: {}",
                    err
                );
                assert_eq!(hull.upper_chain().ok(), upper);
                assert_eq!(hull.lower_chain().ok(), lower);
                assert_eq!(hull.len(), len);
            }
        }
        hull.validate().unwrap();
    }

    assert!(failures > 0, "No update hit the bridge search guard");
    assert_eq!(hull.points().len(), stored.len());
}

#[test]
fn test_render_chains_match_reference() {
    let mut points = testdata::random_grid_points(80, 15);
    let hull = DynamicConvexHull::from_points(points.iter().copied()).unwrap();
    let (upper, lower) = hull.expand_children_for_render();

    assert_eq!(upper.len(), 2 * points.len() - 1);
    assert_eq!(lower.len(), 2 * points.len() - 1);
    assert_eq!(upper[0].chain, hull.upper_chain().unwrap());
    assert_eq!(lower[0].chain, hull.lower_chain().unwrap());

    // Every leaf chain is a single stored point, visited in sorted order.
    points.sort();
    let leaves: Vec<Point> = upper
        .iter()
        .filter(|render| render.is_leaf)
        .map(|render| {
            assert_eq!(render.chain.len(), 1);
            render.chain[0]
        })
        .collect();
    assert_eq!(leaves, points);
}

#[test]
fn test_all_circle_points_on_boundary() {
    let mut points = testdata::circle_points(64, 3.0);
    points.shuffle(&mut rand::rng());
    let hull = DynamicConvexHull::from_points(points.iter().copied()).unwrap();
    assert_eq!(hull.boundary().unwrap().len(), 64);
    assert_matches_reference(&hull, &points);
}

#[test]
fn test_collinear_and_vertical_inputs() {
    let diagonal = testdata::collinear_points(20, 1.0, -2.0);
    let hull = DynamicConvexHull::from_points(diagonal.iter().copied()).unwrap();
    assert_eq!(
        coords(&hull.boundary().unwrap()),
        vec![(0.0, 0.0), (19.0, -38.0)]
    );

    let vertical = testdata::collinear_points(10, 0.0, 1.0);
    let hull = DynamicConvexHull::from_points(vertical.iter().copied()).unwrap();
    assert_eq!(
        coords(&hull.upper_chain().unwrap()),
        vec![(0.0, 0.0), (0.0, 9.0)]
    );
    assert_eq!(
        coords(&hull.lower_chain().unwrap()),
        vec![(0.0, 9.0), (0.0, 0.0)]
    );
    assert_eq!(
        coords(&hull.boundary().unwrap()),
        vec![(0.0, 0.0), (0.0, 9.0)]
    );
}

#[test]
fn test_merge_chains_is_repeatable() {
    let points = testdata::random_grid_points(100, 30);
    let mut sorted = points.clone();
    sorted.sort();
    let (left, right) = sorted.split_at(40);
    let left = testdata::upper_chain_reference(left);
    let right = testdata::upper_chain_reference(right);

    let first = merge_chains(&left, &right).unwrap();
    let second = merge_chains(&left, &right).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.merged(), testdata::upper_chain_reference(&points));
}

#[test]
fn test_config_from_json() {
    let config = HullConfig::from_json(r#"{"validate_after_update": true}"#).unwrap();
    let mut hull = DynamicConvexHull::with_config(config);
    hull.extend_points(testdata::random_disk_points(100, 5.0)).unwrap();
    hull.validate().unwrap();

    let err = HullConfig::from_json("not json").unwrap_err();
    assert!(matches!(err, DynamicHullError::InvalidConfig(_)));
}

#[test]
fn test_tree_export() {
    let hull = DynamicConvexHull::from_points(testdata::lab_points()).unwrap();
    let dot = tree_to_dot(hull.upper().tree());
    assert!(dot.starts_with("digraph g {"));
    assert_eq!(dot.matches("shape = box").count(), 6);
    println!("{}", dot);
}
