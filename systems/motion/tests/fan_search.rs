use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use proptest::prelude::*;
use worms_core::{BlockReason, Circle, LocationStatus};
use worms_system_motion::{
    can_move, fall, move_cost_points, FallOutcome, FanConfig, MotionPlanner, MoveKind,
};
use worms_terrain::{classify, TerrainMap};

fn ground_map() -> TerrainMap {
    TerrainMap::from_ascii(
        10.0,
        5.0,
        "
        ..........
        ..........
        ..........
        #####.####
        ##########
        ",
    )
    .expect("valid layout")
}

fn ceiling_map() -> TerrainMap {
    TerrainMap::from_ascii(
        5.0,
        5.0,
        "
        #####
        #####
        .....
        .....
        .....
        ",
    )
    .expect("valid layout")
}

#[test]
fn actor_under_ceiling_walks_along_it() {
    let map = ceiling_map();
    let footprint = Circle::new(2.5, 1.95, 1.0);
    assert_eq!(classify(&map, &footprint), LocationStatus::Adjacent);

    let plan = MotionPlanner::default().plan(&map, &footprint, 0.0, 4_448);
    assert_eq!(plan.kind(), MoveKind::Adjacent);
    assert_eq!(plan.cost(), 1);
    assert_eq!(
        classify(&map, &Circle::at(plan.destination(), 1.0)),
        LocationStatus::Adjacent
    );
}

#[test]
fn planned_step_then_fall_lands_on_ground() {
    let map = ground_map();
    let footprint = Circle::new(5.0, 4.0, 0.4);
    let plan = MotionPlanner::default().plan(&map, &footprint, 0.0, 50);
    assert_eq!(plan.kind(), MoveKind::PassableFall);

    let outcome = fall(&map, &Circle::at(plan.destination(), 0.4));
    let FallOutcome::Landed { position, .. } = outcome else {
        panic!("expected landing, got {outcome:?}");
    };
    assert_eq!(
        classify(&map, &Circle::at(position, 0.4)),
        LocationStatus::Adjacent
    );
}

#[test]
fn exhausted_actor_cannot_move() {
    let map = ceiling_map();
    let footprint = Circle::new(2.5, 1.95, 1.0);
    assert!(!can_move(&map, &footprint, 0.0, 0));
    assert_eq!(
        MotionPlanner::default().plan(&map, &footprint, 0.0, 0).kind(),
        MoveKind::Blocked(BlockReason::InsufficientActionPoints)
    );
}

fn flat_floor_map() -> TerrainMap {
    TerrainMap::from_ascii(
        10.0,
        5.0,
        "
        ..........
        ..........
        ..........
        ##########
        ##########
        ",
    )
    .expect("valid layout")
}

/// Fan of quarter turns: along the floor both ways reach the full radius.
fn quarter_turn_planner(divergence_steps: u32) -> MotionPlanner {
    MotionPlanner::new(FanConfig {
        divergence_steps,
        heading_step: FRAC_PI_4,
        ..FanConfig::default()
    })
}

#[test]
fn equally_long_steps_prefer_the_smaller_deviation() {
    let map = flat_floor_map();
    let footprint = Circle::new(5.0, 2.52, 0.5);

    // Heading 0 is three steps clockwise and examined first; heading PI is
    // one step counter-clockwise.
    let plan = quarter_turn_planner(3).plan(&map, &footprint, 3.0 * FRAC_PI_4, 20);

    assert_eq!(plan.kind(), MoveKind::Adjacent);
    assert!((plan.heading() - PI).abs() < 1e-9);
    assert!((plan.distance() - 0.5).abs() < 1e-9);
    assert!((plan.destination().x - 4.5).abs() < 1e-9);
}

#[test]
fn symmetric_tie_goes_to_the_clockwise_heading() {
    let map = flat_floor_map();
    let footprint = Circle::new(5.0, 2.52, 0.5);

    let plan = quarter_turn_planner(2).plan(&map, &footprint, FRAC_PI_2, 20);

    assert_eq!(plan.kind(), MoveKind::Adjacent);
    assert!(plan.heading().abs() < 1e-9);
    assert!((plan.distance() - 0.5).abs() < 1e-9);
    assert!((plan.destination().x - 5.5).abs() < 1e-9);
}

#[test]
fn default_fan_keeps_the_facing_on_level_ground() {
    let map = flat_floor_map();
    let footprint = Circle::new(5.0, 2.52, 0.5);

    let plan = MotionPlanner::default().plan(&map, &footprint, 0.0, 20);

    assert_eq!(plan.kind(), MoveKind::Adjacent);
    assert!(plan.heading().abs() < 1e-12);
    assert!((plan.distance() - 0.5).abs() < 1e-9);
}

proptest! {
    #[test]
    fn fan_search_is_deterministic(
        x in 1.2f64..8.8,
        lift in 0.0f64..0.5,
        radius in 0.25f64..1.0,
        orientation in -3.2f64..3.2,
        action_points in 0u32..40,
    ) {
        let map = ground_map();
        let footprint = Circle::new(x, 2.0 + radius + lift, radius);
        let planner = MotionPlanner::default();
        prop_assert_eq!(
            planner.plan(&map, &footprint, orientation, action_points),
            planner.plan(&map, &footprint, orientation, action_points)
        );
    }

    #[test]
    fn resting_steps_are_affordable_and_rest_on_terrain(
        x in 1.2f64..8.8,
        radius in 0.25f64..1.0,
        orientation in -0.8f64..0.8,
        action_points in 0u32..40,
    ) {
        let map = ground_map();
        let footprint = Circle::new(x, 2.0 + radius * 1.05, radius);
        let plan = MotionPlanner::default().plan(&map, &footprint, orientation, action_points);

        if plan.kind() == MoveKind::Adjacent {
            prop_assert!(move_cost_points(plan.heading()) <= action_points);
            prop_assert!(plan.distance() <= radius + 1e-9);
            prop_assert_eq!(
                classify(&map, &Circle::at(plan.destination(), radius)),
                LocationStatus::Adjacent
            );
        }
        prop_assert_eq!(
            plan.is_admissible(),
            can_move(&map, &footprint, orientation, action_points)
        );
    }
}
