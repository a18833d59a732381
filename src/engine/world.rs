//! The simulation world: actor arena, colonies, and the tick scheduler.
//!
//! One tick runs snapshot → execute → reconcile → aggregate → report.
//! The scheduler snapshots every indexed actor id in row-major cell
//! order, steps each live one exactly once, and reconciles the spatial
//! index immediately after each step so later actors in the same tick
//! observe moves and deaths as they happen. Actors created mid-tick are
//! buffered and only join the index after the end-of-tick sweep, so
//! nothing ever observes a same-tick spawn.

use std::collections::HashMap;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::actor::{Actor, ActorId, Body, Coord, Direction, Kind};
use super::compiler::Program;
use super::config::*;
use super::field::{CellTag, Field};
use super::spatial::SpatialIndex;
use super::vm;

/// One ant population: a shared compiled program plus spawn bookkeeping.
pub struct Colony {
    pub name: String,
    pub program: Rc<Program>,
    pub ants_spawned: u32,
    /// Tick at which the current spawn count was reached; breaks ties
    /// for the lead.
    pub last_spawn_tick: u32,
}

/// Outcome of advancing the world one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TickResult {
    Continue,
    /// A colony reached the win threshold while holding the unique lead.
    Won(String),
    /// The tick budget ran out with no winning colony.
    NoWinner,
}

/// Read-only colony standing for a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColonyStanding {
    pub name: String,
    pub ants_spawned: u32,
    pub is_leader: bool,
}

/// Authoritative world state.
pub struct Simulation {
    actors: HashMap<ActorId, Actor>,
    index: SpatialIndex,
    colonies: Vec<Colony>,
    tick: u32,
    next_id: u32,
    /// Actors created this tick, invisible to queries until the tick's
    /// reconciliation completes.
    pending: Vec<Actor>,
    rng: StdRng,
}

impl Simulation {
    /// An empty world of the given dimensions.
    pub fn new(width: i32, height: i32, seed: u64) -> Self {
        Simulation {
            actors: HashMap::new(),
            index: SpatialIndex::new(width, height),
            colonies: Vec::new(),
            tick: 0,
            next_id: 0,
            pending: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Build a world from a terrain layout and up to four compiled
    /// colony programs. Anthill cells for colonies without a loaded
    /// program stay empty.
    pub fn from_field(field: &Field, programs: Vec<(String, Program)>, seed: u64) -> Self {
        let mut sim = Simulation::new(field.width(), field.height(), seed);
        for (name, program) in programs.into_iter().take(MAX_COLONIES) {
            sim.add_colony(name, program);
        }
        for (x, y, tag) in field.iter() {
            let coord = Coord::new(x, y);
            match tag {
                CellTag::Empty => {}
                CellTag::Rock => {
                    sim.place_rock(coord);
                }
                CellTag::Water => {
                    sim.place_water(coord);
                }
                CellTag::Poison => {
                    sim.place_poison(coord);
                }
                CellTag::Food => {
                    sim.place_food(coord, FIELD_FOOD_ENERGY);
                }
                CellTag::Grasshopper => {
                    sim.place_baby_grasshopper(coord);
                }
                CellTag::Anthill(colony) => {
                    if (colony as usize) < sim.colonies.len() {
                        sim.place_anthill(coord, colony);
                    }
                }
            }
        }
        sim
    }

    /// Register a colony. Returns its index, or `None` once the colony
    /// limit is reached (extra programs are ignored, not an error).
    pub fn add_colony(&mut self, name: impl Into<String>, program: Program) -> Option<usize> {
        if self.colonies.len() >= MAX_COLONIES {
            return None;
        }
        self.colonies.push(Colony {
            name: name.into(),
            program: Rc::new(program),
            ants_spawned: 0,
            last_spawn_tick: 0,
        });
        Some(self.colonies.len() - 1)
    }

    // --- Actor placement (world init and tests) ---

    fn alloc_id(&mut self) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert_now(&mut self, actor: Actor) -> ActorId {
        let id = actor.id;
        self.index.insert(id, actor.coord, actor.kind());
        self.actors.insert(id, actor);
        id
    }

    pub fn place_rock(&mut self, coord: Coord) -> ActorId {
        let id = self.alloc_id();
        self.insert_now(Actor::rock(id, coord))
    }

    pub fn place_water(&mut self, coord: Coord) -> ActorId {
        let id = self.alloc_id();
        self.insert_now(Actor::water(id, coord))
    }

    pub fn place_poison(&mut self, coord: Coord) -> ActorId {
        let id = self.alloc_id();
        self.insert_now(Actor::poison(id, coord))
    }

    pub fn place_food(&mut self, coord: Coord, energy: i32) -> ActorId {
        let id = self.alloc_id();
        self.insert_now(Actor::food(id, coord, energy))
    }

    pub fn place_anthill(&mut self, coord: Coord, colony: u8) -> ActorId {
        let id = self.alloc_id();
        self.insert_now(Actor::anthill(id, coord, colony))
    }

    /// Place an ant facing a random direction.
    pub fn place_ant(&mut self, coord: Coord, colony: u8) -> ActorId {
        let dir = self.random_direction();
        self.place_ant_facing(coord, colony, dir)
    }

    pub fn place_ant_facing(&mut self, coord: Coord, colony: u8, dir: Direction) -> ActorId {
        let id = self.alloc_id();
        self.insert_now(Actor::ant(id, coord, colony, dir))
    }

    pub fn place_baby_grasshopper(&mut self, coord: Coord) -> ActorId {
        let dir = self.random_direction();
        let distance = self.rng.gen_range(WALK_DISTANCE_MIN..=WALK_DISTANCE_MAX);
        let id = self.alloc_id();
        self.insert_now(Actor::baby_grasshopper(id, coord, dir, distance))
    }

    pub fn place_adult_grasshopper(&mut self, coord: Coord) -> ActorId {
        let dir = self.random_direction();
        let distance = self.rng.gen_range(WALK_DISTANCE_MIN..=WALK_DISTANCE_MAX);
        let id = self.alloc_id();
        self.insert_now(Actor::adult_grasshopper(id, coord, dir, distance))
    }

    // --- Read-only accessors (tests and presentation) ---

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn tick_count(&self) -> u32 {
        self.tick
    }

    pub fn ticks_remaining(&self) -> u32 {
        MAX_TICKS.saturating_sub(self.tick)
    }

    pub fn colony(&self, idx: usize) -> Option<&Colony> {
        self.colonies.get(idx)
    }

    /// Per-colony standings with the current leader flagged.
    pub fn standings(&self) -> Vec<ColonyStanding> {
        let leader = self.leader();
        self.colonies
            .iter()
            .enumerate()
            .map(|(i, c)| ColonyStanding {
                name: c.name.clone(),
                ants_spawned: c.ants_spawned,
                is_leader: leader == Some(i),
            })
            .collect()
    }

    // --- Tick scheduler ---

    /// Advance the world one tick.
    pub fn tick(&mut self) -> TickResult {
        self.tick += 1;

        // Snapshot fixes the set of actors that act this tick; row-major
        // cell order, insertion order within a cell.
        let snapshot = self.index.snapshot();
        for id in snapshot {
            let Some(actor) = self.actors.get(&id) else {
                continue; // removed earlier this tick
            };
            if actor.is_dead() {
                continue; // killed before its turn; swept below
            }
            let old_coord = actor.coord;
            let old_kind = actor.kind();

            self.step_actor(id);

            // Reconcile immediately so later actors observe the change.
            if let Some(actor) = self.actors.get(&id) {
                if actor.is_dead() {
                    self.index.remove(id, old_coord);
                    self.actors.remove(&id);
                } else if actor.coord != old_coord || actor.kind() != old_kind {
                    let (coord, kind) = (actor.coord, actor.kind());
                    self.index.rekey(id, old_coord, coord, kind);
                }
            }
        }

        // Sweep actors that died after their own turn had passed.
        let mut dead: Vec<(ActorId, Coord)> = self
            .actors
            .values()
            .filter(|a| a.is_dead())
            .map(|a| (a.id, a.coord))
            .collect();
        dead.sort_by_key(|(id, _)| *id);
        for (id, coord) in dead {
            self.index.remove(id, coord);
            self.actors.remove(&id);
        }

        // Deferred spawns become visible starting next tick's snapshot.
        let pending = std::mem::take(&mut self.pending);
        for actor in pending {
            self.insert_now(actor);
        }

        if let Some(name) = self.winner() {
            tracing::info!(winner = %name, tick = self.tick, "colony won");
            return TickResult::Won(name);
        }
        if self.tick >= MAX_TICKS {
            tracing::info!(tick = self.tick, "tick budget exhausted, no winner");
            return TickResult::NoWinner;
        }
        TickResult::Continue
    }

    /// Current leading colony: highest spawn count, ties broken by the
    /// earlier tick at which that count was reached. `None` when nobody
    /// has spawned or the tie is unresolved.
    fn leader(&self) -> Option<usize> {
        let max = self.colonies.iter().map(|c| c.ants_spawned).max()?;
        if max == 0 {
            return None;
        }
        let mut best: Option<usize> = None;
        let mut tied = false;
        for (i, c) in self.colonies.iter().enumerate() {
            if c.ants_spawned != max {
                continue;
            }
            match best {
                None => best = Some(i),
                Some(b) => {
                    let best_tick = self.colonies[b].last_spawn_tick;
                    if c.last_spawn_tick < best_tick {
                        best = Some(i);
                        tied = false;
                    } else if c.last_spawn_tick == best_tick {
                        tied = true;
                    }
                }
            }
        }
        if tied {
            None
        } else {
            best
        }
    }

    fn winner(&self) -> Option<String> {
        let i = self.leader()?;
        let colony = &self.colonies[i];
        (colony.ants_spawned >= WIN_SPAWN_THRESHOLD).then(|| colony.name.clone())
    }

    // --- Per-kind behavior ---

    fn step_actor(&mut self, id: ActorId) {
        let (coord, kind) = {
            let Some(actor) = self.actors.get(&id) else {
                return;
            };
            (actor.coord, actor.kind())
        };
        match kind {
            Kind::Rock | Kind::Food => {}
            Kind::Water => self.step_water(coord),
            Kind::Poison => self.step_poison(coord),
            Kind::Pheromone(_) => self.step_pheromone(id),
            Kind::AntHill(colony) => self.step_anthill(id, colony),
            Kind::Ant(_) => self.step_ant(id),
            Kind::BabyGrasshopper | Kind::AdultGrasshopper => self.step_grasshopper(id),
        }
    }

    /// Water stuns every stunnable insect on its square, once per visit.
    fn step_water(&mut self, coord: Coord) {
        for vid in self.index.ids_at(coord) {
            if let Some(actor) = self.actors.get_mut(&vid) {
                actor.stun();
            }
        }
    }

    /// Poison damages every insect on its square; adults are immune.
    fn step_poison(&mut self, coord: Coord) {
        for vid in self.index.ids_at(coord) {
            let vulnerable = match self.actors.get(&vid).map(|a| &a.body) {
                Some(Body::Ant(_)) => true,
                Some(Body::Grasshopper(g)) => !g.adult,
                _ => false,
            };
            if vulnerable {
                self.damage_insect(vid, POISON_DAMAGE);
            }
        }
    }

    /// Pheromone evaporates one unit per tick and is gone at zero.
    fn step_pheromone(&mut self, id: ActorId) {
        if let Some(actor) = self.actors.get_mut(&id) {
            if let Body::Pheromone { energy, .. } = &mut actor.body {
                *energy -= 1;
            }
        }
    }

    /// Anthill: burn one energy; eat any food on the square; otherwise
    /// spawn an ant when rich enough.
    fn step_anthill(&mut self, id: ActorId, colony: u8) {
        let coord = {
            let Some(actor) = self.actors.get_mut(&id) else {
                return;
            };
            let Body::AntHill { energy, .. } = &mut actor.body else {
                return;
            };
            *energy -= 1;
            if *energy <= 0 {
                return;
            }
            actor.coord
        };

        let eaten = self.consume_food(coord, ANTHILL_MAX_MEAL);
        if eaten > 0 {
            if let Some(actor) = self.actors.get_mut(&id) {
                if let Body::AntHill { energy, .. } = &mut actor.body {
                    *energy += eaten;
                }
            }
            return;
        }

        let can_spawn = matches!(
            self.actors.get(&id).map(|a| &a.body),
            Some(Body::AntHill { energy, .. }) if *energy >= ANTHILL_SPAWN_THRESHOLD
        );
        if can_spawn && (colony as usize) < self.colonies.len() {
            if let Some(actor) = self.actors.get_mut(&id) {
                if let Body::AntHill { energy, .. } = &mut actor.body {
                    *energy -= ANTHILL_SPAWN_COST;
                }
            }
            let dir = self.random_direction();
            let ant_id = self.alloc_id();
            self.pending.push(Actor::ant(ant_id, coord, colony, dir));
            let tick = self.tick;
            let entry = &mut self.colonies[colony as usize];
            entry.ants_spawned += 1;
            entry.last_spawn_tick = tick;
            tracing::debug!(
                colony = %entry.name,
                spawned = entry.ants_spawned,
                tick,
                "anthill spawned an ant"
            );
        }
    }

    /// Ant: burn one energy, serve any stun sleep, then hand the turn
    /// to the program interpreter.
    fn step_ant(&mut self, id: ActorId) {
        if self.damage_insect(id, 1) {
            return;
        }
        {
            let Some(actor) = self.actors.get_mut(&id) else {
                return;
            };
            let Body::Ant(state) = &mut actor.body else {
                return;
            };
            if state.sleep > 0 {
                state.sleep -= 1;
                return;
            }
        }
        vm::run(self, id);
    }

    /// Grasshopper turn, shared by both stages with the adult extras
    /// (bite, jump) layered in front.
    fn step_grasshopper(&mut self, id: ActorId) {
        if self.damage_insect(id, 1) {
            return;
        }
        let (adult, coord, energy) = {
            let Some(actor) = self.actors.get_mut(&id) else {
                return;
            };
            let Body::Grasshopper(state) = &mut actor.body else {
                return;
            };
            if state.sleep > 0 {
                state.sleep -= 1;
                return;
            }
            (state.adult, actor.coord, state.energy)
        };

        if !adult && energy >= MOULT_THRESHOLD {
            // Moult: the adult appears next tick, the baby dies now and
            // leaves the usual corpse food.
            let dir = self.random_direction();
            let distance = self.rng.gen_range(WALK_DISTANCE_MIN..=WALK_DISTANCE_MAX);
            let adult_id = self.alloc_id();
            self.pending
                .push(Actor::adult_grasshopper(adult_id, coord, dir, distance));
            self.damage_insect(id, energy);
            return;
        }

        if adult {
            let targets = self.live_insects_at(coord, id, None);
            if !targets.is_empty() && self.rng.gen_range(0..3) == 0 {
                let victim = targets[self.rng.gen_range(0..targets.len())];
                self.bite(victim, GRASSHOPPER_BITE_DAMAGE);
                self.rest(id);
                return;
            }
            if self.rng.gen_range(0..10) == 0 {
                if let Some(dest) = self.random_jump_square(coord) {
                    if let Some(actor) = self.actors.get_mut(&id) {
                        actor.relocate(dest);
                    }
                    self.rest(id);
                    return;
                }
            }
        }

        let eaten = self.consume_food(coord, GRASSHOPPER_MEAL);
        if eaten > 0 {
            if let Some(actor) = self.actors.get_mut(&id) {
                if let Body::Grasshopper(state) = &mut actor.body {
                    state.energy += eaten;
                }
            }
            // Half the time a meal is followed by a nap instead of a walk.
            if self.rng.gen_bool(0.5) {
                self.rest(id);
                return;
            }
        }

        // Walk: a fresh direction and distance whenever the current
        // walk is exhausted.
        let (dir, distance) = match self.actors.get(&id) {
            Some(actor) => match &actor.body {
                Body::Grasshopper(state) => (actor.dir, state.walk_distance),
                _ => return,
            },
            None => return,
        };
        let (dir, distance) = if distance == 0 {
            let d = self.random_direction();
            let dist = self.rng.gen_range(WALK_DISTANCE_MIN..=WALK_DISTANCE_MAX);
            if let Some(actor) = self.actors.get_mut(&id) {
                actor.dir = d;
            }
            (d, dist)
        } else {
            (dir, distance)
        };

        let dest = coord.step(dir);
        if self.is_blocked(dest) {
            if let Some(actor) = self.actors.get_mut(&id) {
                if let Body::Grasshopper(state) = &mut actor.body {
                    state.walk_distance = 0;
                }
            }
        } else if let Some(actor) = self.actors.get_mut(&id) {
            actor.relocate(dest);
            if let Body::Grasshopper(state) = &mut actor.body {
                state.walk_distance = distance - 1;
            }
        }
        self.rest(id);
    }

    /// Put an insect to sleep for the standard post-action rest.
    fn rest(&mut self, id: ActorId) {
        if let Some(actor) = self.actors.get_mut(&id) {
            match &mut actor.body {
                Body::Ant(a) => a.sleep = ACTION_SLEEP_TICKS,
                Body::Grasshopper(g) => g.sleep = ACTION_SLEEP_TICKS,
                _ => {}
            }
        }
    }

    // --- Shared world mechanics (also driven by the ant VM) ---

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub(crate) fn random_direction(&mut self) -> Direction {
        Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())]
    }

    pub(crate) fn colony_program(&self, colony: u8) -> Option<Rc<Program>> {
        self.colonies.get(colony as usize).map(|c| c.program.clone())
    }

    /// A cell is impassable iff it is out of bounds or holds a rock.
    /// Shared by every mobile actor kind.
    pub(crate) fn is_blocked(&self, coord: Coord) -> bool {
        !self.index.in_bounds(coord) || self.index.contains_kind(coord, Kind::Rock)
    }

    /// Reduce an insect's energy by up to `amount` (never below zero).
    /// Death leaves the standard food yield on the square. Returns
    /// whether the insect is now dead. No-op for non-insects and
    /// already-dead actors.
    pub(crate) fn damage_insect(&mut self, id: ActorId, amount: i32) -> bool {
        let Some(actor) = self.actors.get_mut(&id) else {
            return true;
        };
        let coord = actor.coord;
        let energy = match &mut actor.body {
            Body::Ant(a) => &mut a.energy,
            Body::Grasshopper(g) => &mut g.energy,
            _ => return false,
        };
        if *energy <= 0 {
            return true;
        }
        *energy -= amount.min(*energy);
        if *energy > 0 {
            return false;
        }
        tracing::debug!(actor = id.0, x = coord.x, y = coord.y, "insect died");
        self.add_food(coord, DEATH_FOOD_YIELD);
        true
    }

    /// Bite a victim: flags ant victims as bitten, applies damage, and
    /// lets a surviving adult grasshopper retaliate (coin flip, fixed
    /// damage, random insect on its square). Retaliation can chain.
    pub(crate) fn bite(&mut self, victim: ActorId, damage: i32) {
        if let Some(actor) = self.actors.get_mut(&victim) {
            if let Body::Ant(state) = &mut actor.body {
                state.was_bitten = true;
            }
        }
        if self.damage_insect(victim, damage) {
            return;
        }
        let retaliates = match self.actors.get(&victim).map(|a| &a.body) {
            Some(Body::Grasshopper(g)) => g.adult,
            _ => false,
        };
        if retaliates && self.rng.gen_bool(0.5) {
            let Some(coord) = self.actors.get(&victim).map(|a| a.coord) else {
                return;
            };
            let targets = self.live_insects_at(coord, victim, None);
            if !targets.is_empty() {
                let next = targets[self.rng.gen_range(0..targets.len())];
                self.bite(next, RETALIATION_DAMAGE);
            }
        }
    }

    /// Live insects on a square, excluding `exclude`. With
    /// `friendly_colony` set, ants of that colony are filtered out
    /// (an ant never targets its own colony).
    pub(crate) fn live_insects_at(
        &self,
        coord: Coord,
        exclude: ActorId,
        friendly_colony: Option<u8>,
    ) -> Vec<ActorId> {
        self.index
            .ids_at(coord)
            .into_iter()
            .filter(|&vid| vid != exclude)
            .filter(|vid| {
                let Some(actor) = self.actors.get(vid) else {
                    return false;
                };
                if actor.insect_energy().unwrap_or(0) <= 0 {
                    return false;
                }
                match (friendly_colony, actor.ant_colony()) {
                    (Some(own), Some(colony)) => colony != own,
                    _ => true,
                }
            })
            .collect()
    }

    /// Whether a live food pile sits on the square.
    pub(crate) fn food_here(&self, coord: Coord) -> bool {
        self.index.ids_at_kind(coord, Kind::Food).iter().any(|fid| {
            matches!(
                self.actors.get(fid).map(|a| &a.body),
                Some(Body::Food { energy }) if *energy > 0
            )
        })
    }

    /// Take up to `max` food from the square's pile. Returns the amount
    /// actually taken; partial consumption of an underfull pile is the
    /// defined outcome, not an error.
    pub(crate) fn consume_food(&mut self, coord: Coord, max: i32) -> i32 {
        if max <= 0 {
            return 0;
        }
        for fid in self.index.ids_at_kind(coord, Kind::Food) {
            if let Some(actor) = self.actors.get_mut(&fid) {
                if let Body::Food { energy } = &mut actor.body {
                    if *energy > 0 {
                        let taken = max.min(*energy);
                        *energy -= taken;
                        return taken;
                    }
                }
            }
        }
        0
    }

    /// Add food to the square: tops up a live pile, then a pile queued
    /// earlier this tick, and only then creates a new (deferred) pile.
    pub(crate) fn add_food(&mut self, coord: Coord, amount: i32) {
        if amount <= 0 {
            return;
        }
        for fid in self.index.ids_at_kind(coord, Kind::Food) {
            if let Some(actor) = self.actors.get_mut(&fid) {
                if let Body::Food { energy } = &mut actor.body {
                    *energy += amount;
                    return;
                }
            }
        }
        for queued in &mut self.pending {
            if queued.coord == coord {
                if let Body::Food { energy } = &mut queued.body {
                    *energy += amount;
                    return;
                }
            }
        }
        let id = self.alloc_id();
        self.pending.push(Actor::food(id, coord, amount));
    }

    /// Deposit pheromone for a colony: tops up an existing trail on the
    /// square (saturating at the cap) or lays a new, deferred one.
    pub(crate) fn add_pheromone(&mut self, coord: Coord, colony: u8) {
        for pid in self.index.ids_at_kind(coord, Kind::Pheromone(colony)) {
            if let Some(actor) = self.actors.get_mut(&pid) {
                if let Body::Pheromone { energy, .. } = &mut actor.body {
                    *energy = (*energy + PHEROMONE_DEPOSIT).min(PHEROMONE_MAX);
                    return;
                }
            }
        }
        for queued in &mut self.pending {
            if queued.coord == coord {
                if let Body::Pheromone { colony: c, energy } = &mut queued.body {
                    if *c == colony {
                        *energy = (*energy + PHEROMONE_DEPOSIT).min(PHEROMONE_MAX);
                        return;
                    }
                }
            }
        }
        let id = self.alloc_id();
        self.pending.push(Actor::pheromone(id, coord, colony));
    }

    /// A uniformly random passable square within the jump radius, or
    /// `None` when the neighborhood is fully blocked.
    fn random_jump_square(&mut self, from: Coord) -> Option<Coord> {
        let mut open = Vec::new();
        for dy in -JUMP_RADIUS..=JUMP_RADIUS {
            for dx in -JUMP_RADIUS..=JUMP_RADIUS {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if dx * dx + dy * dy > JUMP_RADIUS * JUMP_RADIUS {
                    continue;
                }
                let dest = Coord::new(from.x + dx, from.y + dy);
                if !self.is_blocked(dest) {
                    open.push(dest);
                }
            }
        }
        if open.is_empty() {
            None
        } else {
            Some(open[self.rng.gen_range(0..open.len())])
        }
    }

    pub(crate) fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }
}
