//! Actor data: grid coordinates, facing directions, the closed set of
//! actor kinds, and the per-variant state each actor carries.
//!
//! Actors are plain data; all world-touching behavior lives in
//! [`super::world`] and [`super::vm`]. The spatial index and the arena
//! refer to actors through stable [`ActorId`] handles.

use serde::Serialize;

use super::config::*;

/// Stable handle for one actor in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorId(pub u32);

/// A grid cell. The world is bounded; bounds checks happen at the
/// simulation layer, a `Coord` itself may be transiently out of range
/// (e.g. one step past an edge while probing a move).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// The adjacent cell one step in `dir`.
    pub fn step(self, dir: Direction) -> Coord {
        match dir {
            Direction::Up => Coord::new(self.x, self.y - 1),
            Direction::Right => Coord::new(self.x + 1, self.y),
            Direction::Down => Coord::new(self.x, self.y + 1),
            Direction::Left => Coord::new(self.x - 1, self.y),
        }
    }
}

/// Facing direction. Variants are in clockwise order so rotation is a
/// plain successor/predecessor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn clockwise(self) -> Direction {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    pub fn counter_clockwise(self) -> Direction {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }
}

/// Species/role tag. Doubles as the secondary component of the spatial
/// index key; colony membership is encoded for the colony-owned kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Rock,
    Water,
    Poison,
    Food,
    Pheromone(u8),
    AntHill(u8),
    Ant(u8),
    BabyGrasshopper,
    AdultGrasshopper,
}

/// Mutable state of one ant.
#[derive(Debug, Clone)]
pub struct AntState {
    pub colony: u8,
    pub energy: i32,
    /// Instruction pointer into the colony program, persisted across ticks.
    pub ip: usize,
    /// Register holding the last `random` draw.
    pub last_random: u32,
    pub food_held: i32,
    pub was_blocked: bool,
    pub was_bitten: bool,
    pub sleep: u32,
    /// Set once the ant has been stunned on its current square.
    pub stunned_here: bool,
}

/// Mutable state of a grasshopper, baby or adult.
#[derive(Debug, Clone)]
pub struct GrasshopperState {
    pub adult: bool,
    pub energy: i32,
    pub sleep: u32,
    /// Squares left to walk before re-rolling direction and distance.
    pub walk_distance: u32,
    pub stunned_here: bool,
}

/// Per-kind payload of an actor. A closed union: adding a kind forces
/// every dispatch site to handle it.
#[derive(Debug, Clone)]
pub enum Body {
    Rock,
    Water,
    Poison,
    Food { energy: i32 },
    Pheromone { colony: u8, energy: i32 },
    AntHill { colony: u8, energy: i32 },
    Ant(AntState),
    Grasshopper(GrasshopperState),
}

/// One simulated entity occupying a grid cell.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: ActorId,
    pub coord: Coord,
    pub dir: Direction,
    pub body: Body,
}

impl Actor {
    pub fn rock(id: ActorId, coord: Coord) -> Self {
        Actor { id, coord, dir: Direction::Right, body: Body::Rock }
    }

    pub fn water(id: ActorId, coord: Coord) -> Self {
        Actor { id, coord, dir: Direction::Right, body: Body::Water }
    }

    pub fn poison(id: ActorId, coord: Coord) -> Self {
        Actor { id, coord, dir: Direction::Right, body: Body::Poison }
    }

    pub fn food(id: ActorId, coord: Coord, energy: i32) -> Self {
        Actor { id, coord, dir: Direction::Right, body: Body::Food { energy } }
    }

    pub fn pheromone(id: ActorId, coord: Coord, colony: u8) -> Self {
        Actor {
            id,
            coord,
            dir: Direction::Right,
            body: Body::Pheromone { colony, energy: PHEROMONE_DEPOSIT },
        }
    }

    pub fn anthill(id: ActorId, coord: Coord, colony: u8) -> Self {
        Actor {
            id,
            coord,
            dir: Direction::Right,
            body: Body::AntHill { colony, energy: ANTHILL_START_ENERGY },
        }
    }

    pub fn ant(id: ActorId, coord: Coord, colony: u8, dir: Direction) -> Self {
        Actor {
            id,
            coord,
            dir,
            body: Body::Ant(AntState {
                colony,
                energy: ANT_START_ENERGY,
                ip: 0,
                last_random: 0,
                food_held: 0,
                was_blocked: false,
                was_bitten: false,
                sleep: 0,
                stunned_here: false,
            }),
        }
    }

    pub fn baby_grasshopper(id: ActorId, coord: Coord, dir: Direction, walk_distance: u32) -> Self {
        Actor {
            id,
            coord,
            dir,
            body: Body::Grasshopper(GrasshopperState {
                adult: false,
                energy: BABY_GRASSHOPPER_ENERGY,
                sleep: 0,
                walk_distance,
                stunned_here: false,
            }),
        }
    }

    pub fn adult_grasshopper(id: ActorId, coord: Coord, dir: Direction, walk_distance: u32) -> Self {
        Actor {
            id,
            coord,
            dir,
            body: Body::Grasshopper(GrasshopperState {
                adult: true,
                energy: ADULT_GRASSHOPPER_ENERGY,
                sleep: 0,
                walk_distance,
                stunned_here: false,
            }),
        }
    }

    pub fn kind(&self) -> Kind {
        match &self.body {
            Body::Rock => Kind::Rock,
            Body::Water => Kind::Water,
            Body::Poison => Kind::Poison,
            Body::Food { .. } => Kind::Food,
            Body::Pheromone { colony, .. } => Kind::Pheromone(*colony),
            Body::AntHill { colony, .. } => Kind::AntHill(*colony),
            Body::Ant(a) => Kind::Ant(a.colony),
            Body::Grasshopper(g) => {
                if g.adult {
                    Kind::AdultGrasshopper
                } else {
                    Kind::BabyGrasshopper
                }
            }
        }
    }

    /// Energy-bearing actors die at zero energy; terrain never dies.
    pub fn is_dead(&self) -> bool {
        match &self.body {
            Body::Rock | Body::Water | Body::Poison => false,
            Body::Food { energy }
            | Body::Pheromone { energy, .. }
            | Body::AntHill { energy, .. } => *energy <= 0,
            Body::Ant(a) => a.energy <= 0,
            Body::Grasshopper(g) => g.energy <= 0,
        }
    }

    pub fn is_insect(&self) -> bool {
        matches!(self.body, Body::Ant(_) | Body::Grasshopper(_))
    }

    /// Colony of an ant, `None` for everything else.
    pub fn ant_colony(&self) -> Option<u8> {
        match &self.body {
            Body::Ant(a) => Some(a.colony),
            _ => None,
        }
    }

    /// Remaining energy of an insect, `None` for non-insects.
    pub fn insect_energy(&self) -> Option<i32> {
        match &self.body {
            Body::Ant(a) => Some(a.energy),
            Body::Grasshopper(g) => Some(g.energy),
            _ => None,
        }
    }

    /// Water stun: adds sleep once per visit to the current square.
    /// Adult grasshoppers are immune. Returns whether the stun landed.
    pub fn stun(&mut self) -> bool {
        match &mut self.body {
            Body::Ant(a) if !a.stunned_here => {
                a.stunned_here = true;
                a.sleep += STUN_SLEEP_TICKS;
                true
            }
            Body::Grasshopper(g) if !g.adult && !g.stunned_here => {
                g.stunned_here = true;
                g.sleep += STUN_SLEEP_TICKS;
                true
            }
            _ => false,
        }
    }

    /// Move to an adjacent cell, clearing the per-square flags a move
    /// resets (stun eligibility; for ants also blocked/bitten).
    pub fn relocate(&mut self, to: Coord) {
        debug_assert_ne!(self.coord, to);
        self.coord = to;
        match &mut self.body {
            Body::Ant(a) => {
                a.stunned_here = false;
                a.was_blocked = false;
                a.was_bitten = false;
            }
            Body::Grasshopper(g) => g.stunned_here = false,
            _ => {}
        }
    }
}
