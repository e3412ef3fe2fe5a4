use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use glam::DVec2;
use worms_core::{
    ActionError, ActorId, BlockReason, Command, Event, FlightTermination, LocationStatus,
    RemovalCause, WeaponKind, Winner,
};
use worms_terrain::TerrainMap;
use worms_world::{self as world, query, World};

const TIME_STEP: f64 = 0.0001;

fn floor_world() -> World {
    World::new(
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
        .expect("valid layout"),
    )
}

fn spawn(world: &mut World, x: f64, y: f64, radius: f64, orientation: f64, name: &str) -> ActorId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnActor {
            position: DVec2::new(x, y),
            orientation,
            radius,
            name: name.to_owned(),
            team: None,
        },
        &mut events,
    )
    .expect("spawn actor");
    match events.as_slice() {
        [Event::ActorSpawned { actor, .. }] => *actor,
        other => panic!("unexpected spawn events {other:?}"),
    }
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events).expect("command accepted");
    events
}

#[test]
fn walking_along_a_ceiling_keeps_contact() {
    let mut world = World::new(
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
        .expect("valid layout"),
    );
    let walker = spawn(&mut world, 2.5, 1.95, 1.0, 0.0, "Ada");
    let _ = spawn(&mut world, 0.5, 0.5, 0.25, 0.0, "Bo");
    let _ = run(&mut world, Command::StartRound);

    assert_eq!(
        query::classify_location(&world, 2.5, 1.95, 1.0),
        LocationStatus::Adjacent
    );
    assert!(query::can_move(&world, walker));
    let before = query::actor(&world, walker).expect("walker").action_points;

    let events = run(&mut world, Command::Move { actor: walker });

    let after = query::actor(&world, walker).expect("walker");
    assert_eq!(
        events,
        vec![Event::ActorMoved {
            actor: walker,
            from: DVec2::new(2.5, 1.95),
            to: DVec2::new(3.5, 1.95),
            cost: 1,
        }]
    );
    assert_eq!(after.action_points, before - 1);
    assert_eq!(
        query::classify_location(&world, after.footprint.x(), after.footprint.y(), 1.0),
        LocationStatus::Adjacent
    );
}

#[test]
fn jumping_spends_every_action_point() {
    let mut world = floor_world();
    let jumper = spawn(&mut world, 2.0, 2.55, 0.5, FRAC_PI_4, "Ada");
    let _ = spawn(&mut world, 0.6, 2.28, 0.25, 0.0, "Bo");
    let _ = run(&mut world, Command::StartRound);
    assert!(query::can_jump(&world, jumper));

    let events = run(
        &mut world,
        Command::Jump {
            actor: jumper,
            time_step: TIME_STEP,
        },
    );
    let Some(Event::ActorJumped { to, .. }) = events.first() else {
        panic!("expected a jump, got {events:?}");
    };
    assert!(to.x > 6.0);

    let landed = query::actor(&world, jumper).expect("jumper");
    assert_eq!(landed.action_points, 0);
    assert!(!query::can_move(&world, jumper));
    assert!(!query::can_jump(&world, jumper));

    let mut rejected = Vec::new();
    assert_eq!(
        world::apply(&mut world, Command::Move { actor: jumper }, &mut rejected),
        Err(ActionError::Blocked {
            reason: BlockReason::InsufficientActionPoints,
        })
    );
    assert_eq!(
        world::apply(
            &mut world,
            Command::Jump {
                actor: jumper,
                time_step: TIME_STEP,
            },
            &mut rejected,
        ),
        Err(ActionError::Blocked {
            reason: BlockReason::InsufficientActionPoints,
        })
    );
    assert!(rejected.is_empty());
    assert_eq!(query::actor(&world, jumper), Some(landed));
}

#[test]
fn out_of_range_yield_is_rejected() {
    let mut world = floor_world();
    let shooter = spawn(&mut world, 2.0, 2.55, 0.5, 0.0, "Ada");
    let _ = spawn(&mut world, 6.0, 2.55, 0.5, PI, "Bo");
    let _ = run(&mut world, Command::StartRound);

    let mut events = Vec::new();
    assert_eq!(
        world::apply(
            &mut world,
            Command::Shoot {
                actor: shooter,
                yield_percent: 150,
                time_step: TIME_STEP,
            },
            &mut events,
        ),
        Err(ActionError::InvalidYield { yield_percent: 150 })
    );
    assert!(events.is_empty());
    assert!(query::active_projectile(&world).is_none());
}

#[test]
fn projectile_must_be_resolved_before_acting_again() {
    let mut world = floor_world();
    let shooter = spawn(&mut world, 2.0, 2.55, 0.5, 0.0, "Ada");
    let target = spawn(&mut world, 6.0, 2.55, 0.5, PI, "Bo");
    let _ = run(&mut world, Command::StartRound);
    let full = query::actor(&world, target).expect("target").hit_points;

    let events = run(
        &mut world,
        Command::Shoot {
            actor: shooter,
            yield_percent: 50,
            time_step: TIME_STEP,
        },
    );
    assert!(matches!(
        events.as_slice(),
        [
            Event::ProjectileFired {
                weapon: WeaponKind::Rifle,
                termination: FlightTermination::Hit { .. },
                ..
            },
            Event::ActorHit { damage: 20, .. },
        ]
    ));
    assert_eq!(
        query::actor(&world, target).expect("target").hit_points,
        full - 20
    );
    assert_eq!(
        query::actor(&world, shooter).expect("shooter").action_points,
        full - 10
    );
    let projectile = query::active_projectile(&world).expect("retained projectile");
    assert_eq!(projectile.launcher(), shooter);

    let mut rejected = Vec::new();
    assert_eq!(
        world::apply(&mut world, Command::Move { actor: shooter }, &mut rejected),
        Err(ActionError::ProjectileInFlight)
    );

    assert_eq!(
        run(&mut world, Command::ResolveProjectile),
        vec![Event::ProjectileResolved]
    );
    assert!(query::active_projectile(&world).is_none());
    assert!(world::apply(&mut world, Command::Move { actor: shooter }, &mut rejected).is_ok());
}

#[test]
fn lethal_bazooka_hit_ends_the_round() {
    let mut world = floor_world();
    let shooter = spawn(&mut world, 2.0, 2.55, 0.5, 0.0, "Ada");
    let target = spawn(&mut world, 4.0, 2.3, 0.25, PI, "Bo");
    let _ = run(&mut world, Command::StartRound);

    assert_eq!(
        run(&mut world, Command::SelectNextWeapon { actor: shooter }),
        vec![Event::WeaponSelected {
            actor: shooter,
            weapon: WeaponKind::Bazooka,
        }]
    );
    let events = run(
        &mut world,
        Command::Shoot {
            actor: shooter,
            yield_percent: 100,
            time_step: TIME_STEP,
        },
    );

    assert_eq!(
        &events[1..],
        &[
            Event::ActorHit {
                actor: target,
                damage: 80,
                remaining: 0,
            },
            Event::ActorRemoved {
                actor: target,
                cause: RemovalCause::Killed,
            },
            Event::RoundOver {
                winner: Some(Winner::Actor(shooter)),
            },
        ]
    );
    assert!(query::is_round_over(&world));
    assert_eq!(query::winner_name(&world), Some("Ada"));

    let mut rejected = Vec::new();
    assert_eq!(
        world::apply(&mut world, Command::Move { actor: shooter }, &mut rejected),
        Err(ActionError::RoundOver)
    );
}

#[test]
fn turning_costs_a_share_of_sixty_points() {
    let mut world = floor_world();
    let turner = spawn(&mut world, 2.0, 2.55, 0.5, 0.0, "Ada");
    let _ = spawn(&mut world, 6.0, 2.55, 0.5, PI, "Bo");
    let _ = run(&mut world, Command::StartRound);
    let before = query::actor(&world, turner).expect("turner").action_points;

    let events = run(
        &mut world,
        Command::Turn {
            actor: turner,
            angle: -PI / 2.0,
        },
    );
    let [Event::ActorTurned {
        orientation, cost, ..
    }] = events.as_slice()
    else {
        panic!("unexpected events {events:?}");
    };
    assert!((orientation - 1.5 * PI).abs() < 1e-12);
    assert_eq!(*cost, 15);
    assert_eq!(
        query::actor(&world, turner).expect("turner").action_points,
        before - 15
    );

    let mut rejected = Vec::new();
    assert_eq!(
        world::apply(
            &mut world,
            Command::Turn {
                actor: turner,
                angle: f64::NAN,
            },
            &mut rejected,
        ),
        Err(ActionError::InvalidAngle)
    );
}

#[test]
fn only_the_turn_holder_may_act() {
    let mut world = floor_world();
    let _ = spawn(&mut world, 2.0, 2.55, 0.5, 0.0, "Ada");
    let waiting = spawn(&mut world, 6.0, 2.55, 0.5, PI, "Bo");
    let _ = run(&mut world, Command::StartRound);

    let mut events = Vec::new();
    assert_eq!(
        world::apply(&mut world, Command::Move { actor: waiting }, &mut events),
        Err(ActionError::NotCurrentActor(waiting))
    );
    assert_eq!(
        world::apply(
            &mut world,
            Command::Move {
                actor: ActorId::new(99),
            },
            &mut events,
        ),
        Err(ActionError::UnknownActor(ActorId::new(99)))
    );
    assert!(events.is_empty());
}

#[test]
fn stepping_off_into_the_air_falls_and_eats() {
    let mut world = floor_world();
    let walker = spawn(&mut world, 2.0, 4.0, 0.4, 0.0, "Ada");
    let _ = spawn(&mut world, 8.0, 2.55, 0.5, PI, "Bo");
    let _ = run(&mut world, Command::SpawnFood {
        position: DVec2::new(2.4, 2.3),
    });
    let _ = run(&mut world, Command::StartRound);
    assert!(query::can_fall(&world, walker));
    let before = query::actor(&world, walker).expect("walker").hit_points;

    let events = run(&mut world, Command::Move { actor: walker });

    assert!(matches!(events[0], Event::ActorMoved { cost: 1, .. }));
    let Event::ActorFell { to, damage, .. } = events[1] else {
        panic!("expected a fall, got {events:?}");
    };
    assert_eq!(damage, 3);
    assert!((to.x - 2.4).abs() < 1e-12);
    assert!(matches!(events[2], Event::FoodEaten { radius, .. } if (radius - 0.44).abs() < 1e-12));
    assert!(query::food(&world).is_empty());

    let landed = query::actor(&world, walker).expect("walker");
    assert_eq!(landed.hit_points, before - 3);
    assert!(landed.max_hit_points > before);
    assert!(!query::can_fall(&world, walker));
    let mut rejected = Vec::new();
    assert_eq!(
        world::apply(&mut world, Command::Fall { actor: walker }, &mut rejected),
        Err(ActionError::Blocked {
            reason: BlockReason::Grounded,
        })
    );
}

#[test]
fn falling_out_of_the_world_hands_the_round_to_the_survivor() {
    let mut world = World::new(
        TerrainMap::from_ascii(4.0, 4.0, "....\n....\n....\n....").expect("valid layout"),
    );
    let faller = spawn(&mut world, 2.0, 2.0, 0.5, 0.0, "Ada");
    let survivor = spawn(&mut world, 3.0, 3.0, 0.5, 0.0, "Bo");
    let _ = run(&mut world, Command::StartRound);

    let events = run(&mut world, Command::Fall { actor: faller });

    assert_eq!(
        events,
        vec![
            Event::ActorRemoved {
                actor: faller,
                cause: RemovalCause::LeftWorld,
            },
            Event::RoundOver {
                winner: Some(Winner::Actor(survivor)),
            },
        ]
    );
    assert_eq!(query::winner_name(&world), Some("Bo"));
}

#[test]
fn stepping_past_the_edge_removes_the_walker() {
    let mut world = floor_world();
    let walker = spawn(&mut world, 9.45, 2.52, 0.5, 0.0, "Ada");
    let survivor = spawn(&mut world, 2.0, 2.55, 0.5, 0.0, "Bo");
    let _ = run(&mut world, Command::StartRound);
    assert!(query::can_move(&world, walker));

    let events = run(&mut world, Command::Move { actor: walker });

    let [Event::ActorMoved { actor, to, cost, .. }, removed, over] = events.as_slice() else {
        panic!("unexpected move events {events:?}");
    };
    assert_eq!(*actor, walker);
    assert_eq!(*cost, 1);
    assert!(to.x + 0.5 > 10.0, "moved to {to}");
    assert_eq!(
        *removed,
        Event::ActorRemoved {
            actor: walker,
            cause: RemovalCause::LeftWorld,
        }
    );
    assert_eq!(
        *over,
        Event::RoundOver {
            winner: Some(Winner::Actor(survivor)),
        }
    );
    assert!(query::actor(&world, walker).is_none());
    assert_eq!(query::winner_name(&world), Some("Bo"));
}

#[test]
fn jumping_off_the_map_removes_the_jumper() {
    let mut world = floor_world();
    let jumper = spawn(&mut world, 9.0, 2.55, 0.5, FRAC_PI_4, "Ada");
    let survivor = spawn(&mut world, 2.0, 2.55, 0.5, 0.0, "Bo");
    let _ = run(&mut world, Command::StartRound);

    let events = run(
        &mut world,
        Command::Jump {
            actor: jumper,
            time_step: TIME_STEP,
        },
    );

    let [Event::ActorJumped { actor, to, .. }, removed, over] = events.as_slice() else {
        panic!("unexpected jump events {events:?}");
    };
    assert_eq!(*actor, jumper);
    assert!(to.x + 0.5 > 10.0, "left at {to}");
    assert_eq!(
        *removed,
        Event::ActorRemoved {
            actor: jumper,
            cause: RemovalCause::LeftWorld,
        }
    );
    assert_eq!(
        *over,
        Event::RoundOver {
            winner: Some(Winner::Actor(survivor)),
        }
    );
    assert!(query::actor(&world, jumper).is_none());
}

#[test]
fn straight_up_jump_comes_down_on_the_surface() {
    let mut rows = vec![".........."; 16];
    rows.extend(["##########"; 4]);
    let mut world = World::new(
        TerrainMap::from_ascii(10.0, 20.0, &rows.join("\n")).expect("valid layout"),
    );
    let jumper = spawn(&mut world, 5.0, 4.55, 0.5, FRAC_PI_2, "Ada");
    let _ = spawn(&mut world, 1.0, 4.55, 0.5, 0.0, "Bo");
    let _ = run(&mut world, Command::StartRound);
    assert!(query::can_jump(&world, jumper));

    let events = run(
        &mut world,
        Command::Jump {
            actor: jumper,
            time_step: TIME_STEP,
        },
    );

    let [Event::ActorJumped { to, flight_time, .. }] = events.as_slice() else {
        panic!("unexpected jump events {events:?}");
    };
    assert!(*flight_time > 1.0);
    assert!((to.x - 5.0).abs() < 1e-6, "landed at {to}");
    assert!(to.y > 4.5 && to.y <= 4.56, "landed at {to}");
    assert_eq!(
        query::classify_location(&world, to.x, to.y, 0.5),
        LocationStatus::Adjacent
    );
    let landed = query::actor(&world, jumper).expect("jumper stays in the round");
    assert_eq!(landed.footprint.center(), *to);
}
