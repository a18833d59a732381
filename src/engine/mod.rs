//! The simulation engine: actors, spatial index, compiler, VM, tick loop.

pub mod actor;
pub mod compiler;
pub mod config;
pub mod field;
pub mod spatial;
pub(crate) mod vm;
pub mod world;
