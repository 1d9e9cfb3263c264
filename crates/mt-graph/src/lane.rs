//! Lanes, cell addressing, and deferred occupancy operations.
//!
//! A lane is a fixed-length array of cells.  Cell 0 is where vehicles enter
//! the edge, cell `len - 1` is the last cell before the destination node.
//! Addressing a cell outside the lane is a programming error and panics with
//! a "capacity exceeded" message.

use std::fmt;

use mt_core::{EdgeId, VehicleId};

// ── Addressing ────────────────────────────────────────────────────────────────

/// One lane of one edge.  Lane 0 is the rightmost lane.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaneRef {
    pub edge: EdgeId,
    pub lane: u8,
}

impl LaneRef {
    #[inline]
    pub fn new(edge: EdgeId, lane: u8) -> Self {
        Self { edge, lane }
    }

    /// The cell `cell` of this lane.
    #[inline]
    pub fn at(self, cell: u32) -> CellPos {
        CellPos { edge: self.edge, lane: self.lane, cell }
    }
}

impl fmt::Display for LaneRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.edge, self.lane)
    }
}

/// One cell of one lane of one edge.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellPos {
    pub edge: EdgeId,
    pub lane: u8,
    pub cell: u32,
}

impl CellPos {
    #[inline]
    pub fn lane_ref(self) -> LaneRef {
        LaneRef { edge: self.edge, lane: self.lane }
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.edge, self.lane, self.cell)
    }
}

// ── Deferred operations ───────────────────────────────────────────────────────

/// What a [`LaneOp`] does to its cell.
///
/// `Vacate` orders before `Occupy` so a sorted batch frees cells before
/// filling them.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum LaneOpKind {
    Vacate,
    Occupy(VehicleId),
}

/// A cell mutation produced by the decision phase and applied in the commit
/// phase.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct LaneOp {
    pub pos: CellPos,
    pub kind: LaneOpKind,
}

impl LaneOp {
    #[inline]
    pub fn vacate(pos: CellPos) -> Self {
        Self { pos, kind: LaneOpKind::Vacate }
    }

    #[inline]
    pub fn occupy(pos: CellPos, vehicle: VehicleId) -> Self {
        Self { pos, kind: LaneOpKind::Occupy(vehicle) }
    }

    /// Sort key: edge first (the commit partition), then vacates first.
    #[inline]
    pub fn sort_key(&self) -> (EdgeId, LaneOpKind, u8, u32) {
        (self.pos.edge, self.kind, self.pos.lane, self.pos.cell)
    }
}

// ── Lane ──────────────────────────────────────────────────────────────────────

/// Cell occupancy of one lane.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lane {
    index: u8,
    cells: Vec<Option<VehicleId>>,
    vehicle_count: usize,
}

impl Lane {
    pub fn new(index: u8, cells: u32) -> Self {
        Self { index, cells: vec![None; cells as usize], vehicle_count: 0 }
    }

    /// Position of this lane on its edge, 0 = rightmost.
    #[inline]
    pub fn index(&self) -> u8 {
        self.index
    }

    #[inline]
    pub fn cell_count(&self) -> u32 {
        self.cells.len() as u32
    }

    #[inline]
    pub fn vehicle_count(&self) -> usize {
        self.vehicle_count
    }

    #[inline]
    fn slot(&self, cell: u32) -> usize {
        let i = cell as usize;
        if i >= self.cells.len() {
            panic!(
                "capacity exceeded: cell {cell} addressed on lane {} with {} cells",
                self.index,
                self.cells.len()
            );
        }
        i
    }

    /// Vehicle in `cell`, if any.
    ///
    /// # Panics
    /// If `cell` is outside the lane.
    #[inline]
    pub fn get(&self, cell: u32) -> Option<VehicleId> {
        self.cells[self.slot(cell)]
    }

    #[inline]
    pub fn is_free(&self, cell: u32) -> bool {
        self.get(cell).is_none()
    }

    /// Put `vehicle` into `cell`.
    ///
    /// # Panics
    /// If `cell` is outside the lane or already occupied.  Either means two
    /// movements were committed into the same cell.
    pub fn occupy(&mut self, cell: u32, vehicle: VehicleId) {
        let i = self.slot(cell);
        if let Some(other) = self.cells[i] {
            panic!("cell {cell} of lane {} already holds {other}, cannot place {vehicle}", self.index);
        }
        self.cells[i] = Some(vehicle);
        self.vehicle_count += 1;
    }

    /// Empty `cell`, returning the vehicle that was there.
    pub fn vacate(&mut self, cell: u32) -> Option<VehicleId> {
        let i = self.slot(cell);
        let prev = self.cells[i].take();
        if prev.is_some() {
            self.vehicle_count -= 1;
        }
        prev
    }

    /// First occupied cell at or after `from`.
    pub fn next_occupied_from(&self, from: u32) -> Option<u32> {
        if self.vehicle_count == 0 {
            return None;
        }
        self.cells
            .iter()
            .enumerate()
            .skip(from as usize)
            .find_map(|(i, c)| c.map(|_| i as u32))
    }

    /// Lowest occupied cell (the vehicle that entered last).
    #[inline]
    pub fn first_occupied(&self) -> Option<u32> {
        self.next_occupied_from(0)
    }

    /// The vehicle closest to the destination node, with its cell.
    pub fn front(&self) -> Option<(u32, VehicleId)> {
        if self.vehicle_count == 0 {
            return None;
        }
        self.cells
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, c)| c.map(|v| (i as u32, v)))
    }

    /// Occupied cells in driving order.
    pub fn vehicles(&self) -> impl Iterator<Item = (u32, VehicleId)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.map(|v| (i as u32, v)))
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
        self.vehicle_count = 0;
    }
}
