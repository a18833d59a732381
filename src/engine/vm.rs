//! Per-ant program interpreter.
//!
//! Every awake ant gets one turn per tick: up to a fixed number of
//! instruction steps, ending early as soon as an action instruction
//! runs. Control-flow instructions (random, goto, if) are free within
//! the budget; a turn that exhausts the budget without reaching an
//! action simply ends. Running the instruction pointer off the end of
//! the program kills the ant.

use rand::Rng;

use super::actor::{ActorId, AntState, Body, Coord, Direction, Kind};
use super::compiler::{Condition, Op};
use super::config::*;
use super::world::Simulation;

/// Execute one ant's turn.
pub(crate) fn run(sim: &mut Simulation, id: ActorId) {
    let Some((colony, mut ip)) = ant_view(sim, id).map(|a| (a.colony, a.ip)) else {
        return;
    };
    let Some(program) = sim.colony_program(colony) else {
        // No program for this colony: the ant cannot act, ever.
        kill(sim, id);
        return;
    };

    for _ in 0..VM_STEPS_PER_TICK {
        let Some(op) = program.get(ip) else {
            // Instruction pointer ran off the end: broken program, the
            // ant dies where it stands.
            tracing::debug!(actor = id.0, ip, "program counter out of range, ant dies");
            kill(sim, id);
            return;
        };
        match op {
            Op::Goto { target } => ip = target,
            Op::Random { bound } => {
                let value = if bound == 0 {
                    0
                } else {
                    sim.rng_mut().gen_range(0..bound)
                };
                if let Some(ant) = ant_view_mut(sim, id) {
                    ant.last_random = value;
                }
                ip += 1;
            }
            Op::If { cond, target } => {
                ip = if eval(sim, id, cond) { target } else { ip + 1 };
            }
            action => {
                debug_assert!(action.is_action());
                exec(sim, id, action);
                ip += 1;
                break;
            }
        }
    }

    if let Some(ant) = ant_view_mut(sim, id) {
        ant.ip = ip;
    }
}

fn kill(sim: &mut Simulation, id: ActorId) {
    let energy = match ant_view(sim, id) {
        Some(ant) => ant.energy,
        None => return,
    };
    sim.damage_insect(id, energy);
}

fn ant_view(sim: &Simulation, id: ActorId) -> Option<&AntState> {
    match sim.actor(id).map(|a| &a.body) {
        Some(Body::Ant(state)) => Some(state),
        _ => None,
    }
}

fn ant_view_mut(sim: &mut Simulation, id: ActorId) -> Option<&mut AntState> {
    match sim.actor_mut(id).map(|a| &mut a.body) {
        Some(Body::Ant(state)) => Some(state),
        _ => None,
    }
}

fn position(sim: &Simulation, id: ActorId) -> Option<(Coord, Direction, u8)> {
    let actor = sim.actor(id)?;
    match &actor.body {
        Body::Ant(state) => Some((actor.coord, actor.dir, state.colony)),
        _ => None,
    }
}

/// Perform one action instruction. Exactly one action runs per turn.
fn exec(sim: &mut Simulation, id: ActorId, op: Op) {
    let Some((coord, dir, colony)) = position(sim, id) else {
        return;
    };
    match op {
        Op::MoveForward => {
            let dest = coord.step(dir);
            if sim.is_blocked(dest) {
                if let Some(ant) = ant_view_mut(sim, id) {
                    ant.was_blocked = true;
                }
            } else if let Some(actor) = sim.actor_mut(id) {
                // Clears the blocked, bitten and stun-visit flags; the
                // scheduler reconciles the index after the turn.
                actor.relocate(dest);
            }
        }
        Op::EatFood => {
            if let Some(ant) = ant_view_mut(sim, id) {
                let meal = ANT_MEAL.min(ant.food_held);
                ant.food_held -= meal;
                ant.energy += meal;
            }
        }
        Op::DropFood => {
            let held = match ant_view_mut(sim, id) {
                Some(ant) => std::mem::take(&mut ant.food_held),
                None => 0,
            };
            sim.add_food(coord, held);
        }
        Op::Bite => {
            let targets = sim.live_insects_at(coord, id, Some(colony));
            if !targets.is_empty() {
                let victim = targets[sim.rng_mut().gen_range(0..targets.len())];
                sim.bite(victim, ANT_BITE_DAMAGE);
            }
        }
        Op::PickupFood => {
            let space = match ant_view(sim, id) {
                Some(ant) => ANT_MAX_CARRY - ant.food_held,
                None => 0,
            };
            let taken = sim.consume_food(coord, ANT_PICKUP_AMOUNT.min(space));
            if let Some(ant) = ant_view_mut(sim, id) {
                ant.food_held += taken;
            }
        }
        Op::EmitPheromone => {
            sim.add_pheromone(coord, colony);
        }
        Op::FaceRandom => {
            let d = sim.random_direction();
            if let Some(actor) = sim.actor_mut(id) {
                actor.dir = d;
            }
        }
        Op::RotateCw => {
            if let Some(actor) = sim.actor_mut(id) {
                actor.dir = actor.dir.clockwise();
            }
        }
        Op::RotateCcw => {
            if let Some(actor) = sim.actor_mut(id) {
                actor.dir = actor.dir.counter_clockwise();
            }
        }
        Op::Random { .. } | Op::Goto { .. } | Op::If { .. } => {}
    }
}

/// Evaluate a branch condition against the ant's senses.
fn eval(sim: &Simulation, id: ActorId, cond: Condition) -> bool {
    let Some((coord, dir, colony)) = position(sim, id) else {
        return false;
    };
    let Some(ant) = ant_view(sim, id) else {
        return false;
    };
    let ahead = coord.step(dir);
    match cond {
        // Out-of-bounds squares smell of nothing.
        Condition::SmellDangerAhead => {
            sim.index().contains_kind(ahead, Kind::Poison)
                || !sim.live_insects_at(ahead, id, Some(colony)).is_empty()
        }
        Condition::SmellPheromoneAhead => {
            sim.index().contains_kind(ahead, Kind::Pheromone(colony))
        }
        Condition::WasBitten => ant.was_bitten,
        Condition::CarryingFood => ant.food_held > 0,
        Condition::Hungry => ant.energy <= ANT_HUNGER_THRESHOLD,
        Condition::OnMyHill => sim.index().contains_kind(coord, Kind::AntHill(colony)),
        Condition::OnFood => sim.food_here(coord),
        Condition::EnemyHere => !sim.live_insects_at(coord, id, Some(colony)).is_empty(),
        Condition::WasBlocked => ant.was_blocked,
        Condition::LastRandomWasZero => ant.last_random == 0,
    }
}
