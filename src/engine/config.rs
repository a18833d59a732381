// Simulation constants. Everything tunable lives here.

/// Total ticks before the run ends without a winner.
pub const MAX_TICKS: u32 = 2000;

/// Upper bound on loaded colonies; extra programs are ignored.
pub const MAX_COLONIES: usize = 4;

/// A colony must have produced at least this many ants to win.
pub const WIN_SPAWN_THRESHOLD: u32 = 6;

/// Instructions an ant may execute per tick before its turn ends.
pub const VM_STEPS_PER_TICK: u32 = 10;

// Ants
pub const ANT_START_ENERGY: i32 = 1500;
pub const ANT_BITE_DAMAGE: i32 = 15;
pub const ANT_MAX_CARRY: i32 = 1800;
pub const ANT_PICKUP_AMOUNT: i32 = 400;
pub const ANT_MEAL: i32 = 100;
/// The `hungry` condition holds at or below this energy.
pub const ANT_HUNGER_THRESHOLD: i32 = 25;

// Anthills
pub const ANTHILL_START_ENERGY: i32 = 8999;
/// Minimum energy before an anthill will spawn an ant.
pub const ANTHILL_SPAWN_THRESHOLD: i32 = 2000;
pub const ANTHILL_SPAWN_COST: i32 = 1500;
/// Food an anthill can absorb from its square in one tick.
pub const ANTHILL_MAX_MEAL: i32 = 10000;

// Grasshoppers
pub const BABY_GRASSHOPPER_ENERGY: i32 = 500;
pub const ADULT_GRASSHOPPER_ENERGY: i32 = 1600;
/// A baby moults into an adult at this energy.
pub const MOULT_THRESHOLD: i32 = 1600;
pub const GRASSHOPPER_MEAL: i32 = 200;
pub const GRASSHOPPER_BITE_DAMAGE: i32 = 50;
pub const RETALIATION_DAMAGE: i32 = 50;
/// Euclidean radius an adult grasshopper may jump within.
pub const JUMP_RADIUS: i32 = 10;
pub const WALK_DISTANCE_MIN: u32 = 2;
pub const WALK_DISTANCE_MAX: u32 = 10;

// Hazards
pub const POISON_DAMAGE: i32 = 150;
/// Extra sleep ticks from a water stun.
pub const STUN_SLEEP_TICKS: u32 = 2;
/// Sleep ticks an insect rests between actions.
pub const ACTION_SLEEP_TICKS: u32 = 2;

// Pheromone
pub const PHEROMONE_DEPOSIT: i32 = 256;
pub const PHEROMONE_MAX: i32 = 768;

// Food
/// Energy of a food pile seeded from the terrain file.
pub const FIELD_FOOD_ENERGY: i32 = 6000;
/// Food left on the square when an insect dies.
pub const DEATH_FOOD_YIELD: i32 = 100;
