use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use crate::nav::dungeon::{Cell, DungeonGrid};
use crate::nav::fixed_math::{FixedNum, FixedVec2};

/// Index of a super-tile region, row-major over the region lattice.
pub type RegionId = usize;

/// Index into [`PortalGraph::portals`](super::PortalGraph::portals).
pub type PortalId = usize;

/// Inclusive rectangle a local search may not leave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchBounds {
    pub min: Cell,
    pub max: Cell,
}

impl SearchBounds {
    pub const fn new(min: Cell, max: Cell) -> Self {
        Self { min, max }
    }

    /// The whole grid. `None` for a grid with no cells.
    pub fn full(grid: &DungeonGrid) -> Option<Self> {
        if grid.width == 0 || grid.height == 0 {
            return None;
        }
        Some(Self::new(
            Cell::new(0, 0),
            Cell::new(grid.width as i32 - 1, grid.height as i32 - 1),
        ))
    }

    /// Intersect with the grid. `None` if nothing is left.
    pub fn clipped_to(self, grid: &DungeonGrid) -> Option<Self> {
        Self::full(grid)?.intersect(&self)
    }

    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.min.x && cell.x <= self.max.x && cell.y >= self.min.y && cell.y <= self.max.y
    }

    #[inline]
    pub fn width(&self) -> usize {
        (self.max.x - self.min.x + 1) as usize
    }

    #[inline]
    pub fn height(&self) -> usize {
        (self.max.y - self.min.y + 1) as usize
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// Local row-major index of a cell inside the bounds.
    #[inline]
    pub(super) fn local_index(&self, cell: Cell) -> usize {
        (cell.y - self.min.y) as usize * self.width() + (cell.x - self.min.x) as usize
    }

    #[inline]
    pub(super) fn local_cell(&self, index: usize) -> Cell {
        let w = self.width();
        Cell::new(self.min.x + (index % w) as i32, self.min.y + (index / w) as i32)
    }

    /// Cells of the rectangle, rows outer, columns inner.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (self.min.y..=self.max.y).flat_map(move |y| (self.min.x..=self.max.x).map(move |x| Cell::new(x, y)))
    }

    pub fn intersect(&self, other: &SearchBounds) -> Option<SearchBounds> {
        let min = Cell::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y));
        let max = Cell::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y));
        (min.x <= max.x && min.y <= max.y).then_some(SearchBounds::new(min, max))
    }
}

/// Weighted edge to another portal of a shared region.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortalConnection {
    pub target: PortalId,
    /// Cells on the shortest probe path between the two footprints.
    pub cost: f32,
}

/// Whether a portal crosses the top or the left border of the region that found it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortalAxis {
    /// Horizontal span; `start` is in the region above.
    Top,
    /// Vertical span; `start` is in the region to the left.
    Left,
}

/// A maximal walkable span across the border of two adjacent regions.
///
/// The footprint is the inclusive rectangle `start..=end`. It is two cells
/// thick across the border: `start` lies in the neighbouring region, `end`
/// in the region that scanned its border.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    pub start: Cell,
    pub end: Cell,
    pub axis: PortalAxis,
    /// The scanning region first, the neighbour second.
    pub regions: [RegionId; 2],
    pub connections: SmallVec<[PortalConnection; 8]>,
}

impl Portal {
    pub fn footprint(&self) -> SearchBounds {
        SearchBounds::new(self.start, self.end)
    }

    /// Footprint center in cell units, used as the portal-graph heuristic anchor.
    pub fn center(&self) -> (f32, f32) {
        (
            (self.start.x + self.end.x) as f32 / 2.0,
            (self.start.y + self.end.y) as f32 / 2.0,
        )
    }

    /// World-space center of the footprint rectangle.
    pub fn world_center(&self, tile_size: FixedNum) -> FixedVec2 {
        let two = FixedNum::from_num(2);
        FixedVec2::new(
            FixedNum::from_num(self.start.x + self.end.x + 1) * tile_size / two,
            FixedNum::from_num(self.start.y + self.end.y + 1) * tile_size / two,
        )
    }

    /// Number of cells along the border.
    pub fn span(&self) -> usize {
        match self.axis {
            PortalAxis::Top => (self.end.x - self.start.x + 1) as usize,
            PortalAxis::Left => (self.end.y - self.start.y + 1) as usize,
        }
    }

    pub fn connection_to(&self, target: PortalId) -> Option<&PortalConnection> {
        self.connections.iter().find(|c| c.target == target)
    }
}

/// Result of a portal-graph search.
#[derive(Clone, Debug, PartialEq)]
pub struct PortalPath {
    pub portals: Vec<PortalId>,
    /// Sum of connection costs; `f32::INFINITY` when `portals` is empty.
    pub cost: f32,
}

impl PortalPath {
    pub fn none() -> Self {
        Self { portals: Vec::new(), cost: f32::INFINITY }
    }

    pub fn is_found(&self) -> bool {
        !self.portals.is_empty()
    }
}
