// Integration tests: whole simulation runs, from source text and
// terrain files down to the reported outcome.

use formicary::engine::actor::{Coord, Direction, Kind};
use formicary::engine::compiler::compile;
use formicary::engine::config::*;
use formicary::engine::field::Field;
use formicary::engine::world::{Simulation, TickResult};

const MEADOW: &str = include_str!("../data/fields/meadow.txt");
const FORAGER: &str = include_str!("../data/programs/forager.ant");
const BRUISER: &str = include_str!("../data/programs/bruiser.ant");

/// World loaded from the stock meadow with both stock programs.
fn meadow_world(seed: u64) -> Simulation {
    let field = Field::parse(MEADOW).expect("stock field parses");
    let programs = vec![
        compile(FORAGER).expect("forager compiles"),
        compile(BRUISER).expect("bruiser compiles"),
    ];
    Simulation::from_field(&field, programs, seed)
}

/// Sorted (id, x, y) layout of every indexed actor.
fn layout(sim: &Simulation) -> Vec<(u32, i32, i32)> {
    let mut rows: Vec<(u32, i32, i32)> = sim
        .index()
        .snapshot()
        .into_iter()
        .map(|id| {
            let actor = sim.actor(id).expect("indexed actor exists");
            (id.0, actor.coord.x, actor.coord.y)
        })
        .collect();
    rows.sort();
    rows
}

#[test]
fn test_stock_programs_compile() {
    let (name, program) = compile(FORAGER).unwrap();
    assert_eq!(name, "Foragers");
    assert!(!program.is_empty());
    let (name, program) = compile(BRUISER).unwrap();
    assert_eq!(name, "Bruisers");
    assert!(!program.is_empty());
}

#[test]
fn test_meadow_runs_to_an_outcome() {
    let mut sim = meadow_world(1);
    let mut result = TickResult::Continue;
    while result == TickResult::Continue {
        result = sim.tick();
    }
    assert!(sim.tick_count() <= MAX_TICKS);
    match result {
        TickResult::Won(name) => {
            assert!(name == "Foragers" || name == "Bruisers");
            let standings = sim.standings();
            let winner = standings.iter().find(|s| s.name == name).unwrap();
            assert!(winner.is_leader);
            assert!(winner.ants_spawned >= WIN_SPAWN_THRESHOLD);
        }
        TickResult::NoWinner => assert_eq!(sim.tick_count(), MAX_TICKS),
        TickResult::Continue => unreachable!(),
    }
}

#[test]
fn test_same_seed_same_run() {
    let mut first = meadow_world(7);
    let mut second = meadow_world(7);
    for _ in 0..300 {
        assert_eq!(first.tick(), second.tick());
    }
    assert_eq!(layout(&first), layout(&second));
    assert_eq!(first.standings(), second.standings());
}

#[test]
fn test_well_fed_hill_wins_within_budget() {
    let mut sim = Simulation::new(8, 8, 3);
    let (name, program) =
        compile("colony Spinners\nstart:\nrotate_cw\ngoto start\n").unwrap();
    sim.add_colony(name, program);
    let hill = Coord::new(4, 4);
    sim.place_anthill(hill, 0);
    sim.place_food(hill, 100_000);

    let mut result = TickResult::Continue;
    while result == TickResult::Continue {
        result = sim.tick();
    }
    // Eats the pile first, then spawns every tick; the win is reported
    // at the end of the tick of the sixth spawn.
    assert_eq!(result, TickResult::Won("Spinners".to_string()));
    assert!(sim.tick_count() < 50);
    assert_eq!(sim.colony(0).unwrap().ants_spawned, WIN_SPAWN_THRESHOLD);
}

#[test]
fn test_marching_ant_stops_at_rock() {
    let mut sim = Simulation::new(8, 8, 5);
    let (name, program) =
        compile("colony March\nstart:\nmove_forward\ngoto start\n").unwrap();
    sim.add_colony(name, program);
    sim.place_rock(Coord::new(4, 1));
    let ant = sim.place_ant_facing(Coord::new(1, 1), 0, Direction::Right);

    sim.tick();
    assert_eq!(sim.actor(ant).unwrap().coord, Coord::new(2, 1));
    sim.tick();
    assert_eq!(sim.actor(ant).unwrap().coord, Coord::new(3, 1));
    for _ in 0..10 {
        sim.tick();
        assert_eq!(sim.actor(ant).unwrap().coord, Coord::new(3, 1));
    }
}

#[test]
fn test_starved_ant_becomes_food_by_end_of_tick() {
    let mut sim = Simulation::new(8, 8, 2);
    // A colony whose program immediately runs off the end: its ants die
    // on their first turn.
    let (name, program) = compile("colony Doomed\n").unwrap();
    sim.add_colony(name, program);
    let spot = Coord::new(6, 2);
    let ant = sim.place_ant(spot, 0);

    sim.tick();
    assert!(sim.actor(ant).is_none());
    let food = sim.index().ids_at_kind(spot, Kind::Food);
    assert_eq!(food.len(), 1);
}

#[test]
fn test_empty_world_times_out() {
    let mut sim = Simulation::new(4, 4, 0);
    let (name, program) = compile("colony Ghost\n").unwrap();
    sim.add_colony(name, program);

    let mut result = TickResult::Continue;
    while result == TickResult::Continue {
        result = sim.tick();
    }
    assert_eq!(result, TickResult::NoWinner);
    assert_eq!(sim.tick_count(), MAX_TICKS);
    assert!(sim.standings().iter().all(|s| s.ants_spawned == 0 && !s.is_leader));
}

#[test]
fn test_meadow_population_stays_consistent() {
    let mut sim = meadow_world(11);
    for _ in 0..500 {
        sim.tick();
        // Every indexed id resolves to a live actor at that position.
        for id in sim.index().snapshot() {
            let actor = sim.actor(id).expect("dangling id in index");
            assert!(sim.index().ids_at(actor.coord).contains(&id));
        }
    }
    // The rock border never erodes.
    let field = Field::parse(MEADOW).unwrap();
    for x in 0..field.width() {
        assert!(sim.index().contains_kind(Coord::new(x, 0), Kind::Rock));
        assert!(sim
            .index()
            .contains_kind(Coord::new(x, field.height() - 1), Kind::Rock));
    }
}
