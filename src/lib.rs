//! Formicary: a deterministic insect-colony simulation on a bounded grid.
//!
//! Ant colonies are driven by small programs compiled from a textual
//! behavior language into a label-resolved instruction list; every other
//! actor (grasshoppers, anthills, food, water, poison, pheromone trails)
//! follows fixed rules. The whole world advances one tick at a time and
//! is fully reproducible from a seed.

pub mod config;
pub mod engine;
