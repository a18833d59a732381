//! Cell-exact spatial index over all live actors.
//!
//! One bucket per grid cell, each holding `(actor, kind)` entries in
//! insertion order. The same structure answers "everything on this
//! square" and "everything of kind K on this square" without a second
//! index, and its row-major traversal fixes the per-tick processing
//! order of the scheduler.

use super::actor::{ActorId, Coord, Kind};

/// Entry in the spatial index: actor handle plus its kind tag, so
/// kind-filtered queries never touch the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpatialEntry {
    pub id: ActorId,
    pub kind: Kind,
}

/// Grid of per-cell entry lists. Multimap semantics: any number of
/// actors, of any mix of kinds, may share a cell.
pub struct SpatialIndex {
    width: i32,
    height: i32,
    cells: Vec<Vec<SpatialEntry>>,
}

impl SpatialIndex {
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "index dimensions must be positive");
        SpatialIndex {
            width,
            height,
            cells: vec![Vec::new(); (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.x < self.width && coord.y >= 0 && coord.y < self.height
    }

    fn cell_index(&self, coord: Coord) -> usize {
        debug_assert!(self.in_bounds(coord));
        (coord.y * self.width + coord.x) as usize
    }

    /// Register an actor at `coord`. The caller guarantees the actor is
    /// not already present anywhere in the index.
    pub fn insert(&mut self, id: ActorId, coord: Coord, kind: Kind) {
        assert!(self.in_bounds(coord), "insert outside the field: {coord:?}");
        let idx = self.cell_index(coord);
        self.cells[idx].push(SpatialEntry { id, kind });
    }

    /// Drop the entry for `id` at `coord`. Entries after it keep their
    /// relative order so same-cell iteration stays deterministic.
    pub fn remove(&mut self, id: ActorId, coord: Coord) {
        let idx = self.cell_index(coord);
        let cell = &mut self.cells[idx];
        let pos = cell
            .iter()
            .position(|e| e.id == id)
            .unwrap_or_else(|| panic!("actor {id:?} not indexed at {coord:?}"));
        cell.remove(pos);
    }

    /// Move an actor's entry to a new cell (and/or new kind). The entry
    /// joins the tail of the destination cell.
    pub fn rekey(&mut self, id: ActorId, old_coord: Coord, new_coord: Coord, kind: Kind) {
        self.remove(id, old_coord);
        self.insert(id, new_coord, kind);
    }

    /// All entries on a square, in insertion order. Out-of-bounds
    /// coordinates hold nothing.
    pub fn entries_at(&self, coord: Coord) -> &[SpatialEntry] {
        if !self.in_bounds(coord) {
            return &[];
        }
        &self.cells[self.cell_index(coord)]
    }

    /// Owned id list for a square; use when the caller will mutate the
    /// index or the arena while iterating.
    pub fn ids_at(&self, coord: Coord) -> Vec<ActorId> {
        self.entries_at(coord).iter().map(|e| e.id).collect()
    }

    /// Owned id list for one kind on a square.
    pub fn ids_at_kind(&self, coord: Coord, kind: Kind) -> Vec<ActorId> {
        self.entries_at(coord)
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.id)
            .collect()
    }

    pub fn contains_kind(&self, coord: Coord, kind: Kind) -> bool {
        self.entries_at(coord).iter().any(|e| e.kind == kind)
    }

    /// Every indexed id in processing order: row-major over cells
    /// (ascending y, then x), insertion order within a cell. This is
    /// the order the scheduler snapshots each tick.
    pub fn snapshot(&self) -> Vec<ActorId> {
        self.cells
            .iter()
            .flat_map(|cell| cell.iter().map(|e| e.id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Vec::is_empty)
    }
}
