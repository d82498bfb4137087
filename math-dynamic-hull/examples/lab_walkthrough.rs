//! Walk through the classroom scenario step by step
//!
//! Run with `RUST_LOG=debug` to see every update logged by the library.

use math_dynamic_hull::{DynamicConvexHull, DynamicHullError, Point, testdata, tree_to_dot};

fn print_chain(label: &str, chain: &[Point]) {
    let points: Vec<String> = chain.iter().map(|p| p.to_string()).collect();
    println!("{:>8}: {}", label, points.join(" -> "));
}

fn print_hull(hull: &DynamicConvexHull) -> math_dynamic_hull::Result<()> {
    print_chain("upper", &hull.upper_chain()?);
    print_chain("lower", &hull.lower_chain()?);
    print_chain("boundary", &hull.boundary()?);
    println!("{:>8}: {}", "height", hull.height());
    Ok(())
}

fn main() -> math_dynamic_hull::Result<()> {
    env_logger::init();

    let mut hull = DynamicConvexHull::new();
    for p in testdata::lab_points() {
        hull.insert(p)?;
        println!("\nInserted {}", p);
        print_hull(&hull)?;
    }

    let absent = Point::new(5.0, -3.0);
    match hull.delete(&absent) {
        Err(DynamicHullError::PointNotFound { point }) => {
            println!("\n{} is not stored, hull unchanged", point)
        }
        other => println!("\nUnexpected result: {:?}", other),
    }

    let removed = hull.delete(&Point::new(6.0, 10.0))?;
    println!("\nDeleted {} (id {})", removed, removed.id);
    print_hull(&hull)?;

    println!("\nPer-node upper chains:");
    let (upper, _) = hull.expand_children_for_render();
    for render in upper {
        let indent = "  ".repeat(render.depth);
        let points: Vec<String> = render.chain.iter().map(|p| p.to_string()).collect();
        println!("{}{:?}: {}", indent, render.node, points.join(" "));
    }

    println!("\n{}", tree_to_dot(hull.upper().tree()));
    Ok(())
}
