use serde::{Deserialize, Serialize};
use crate::nav::dungeon::{Cell, DungeonGrid};
use crate::nav::profiling::profile;

/// Value of walls and of floor cells no seed can reach.
pub const UNREACHABLE: f32 = 1e5;

/// Scalar step-distance field over the dungeon ("Dijkstra map").
///
/// Every floor cell holds the number of 4-connected steps to the nearest
/// seed. Walls and floor cells cut off from every seed hold [`UNREACHABLE`].
/// Steering reads a direction out of the field by stepping to the lowest
/// neighbour (see [`FlowField::descent_step`]).
///
/// # Algorithm
///
/// Relaxation sweeps rather than a priority queue: seeds start at 0 and
/// everything else at the sentinel, then the grid is scanned row-major and
/// each floor cell is pulled down to `1 + min(neighbours)` whenever that is
/// more than one step better. Sweeps repeat until a full pass changes
/// nothing. Relaxing only ever lowers values, so a transformed field (see
/// [`FlowField::into_flee`]) can be relaxed again in place.
///
/// # Example
///
/// ```rust,ignore
/// let field = generate_flow_field(&grid, &[player_cell]);
/// if let Some(next) = field.descent_step(&grid, monster_cell) {
///     // move toward `next`
/// }
/// ```
///
/// Fields are rebuilt from scratch on every request; there is no incremental
/// update.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowField {
    pub width: usize,
    pub height: usize,
    /// Row-major, `width * height` entries.
    pub values: Vec<f32>,
}

impl FlowField {
    /// Field with every cell at the sentinel.
    pub fn unreached(grid: &DungeonGrid) -> Self {
        Self {
            width: grid.width,
            height: grid.height,
            values: vec![UNREACHABLE; grid.width * grid.height],
        }
    }

    #[inline]
    fn index(&self, cell: Cell) -> Option<usize> {
        (cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < self.width && (cell.y as usize) < self.height)
            .then(|| cell.y as usize * self.width + cell.x as usize)
    }

    /// `None` outside the field.
    pub fn value_at(&self, cell: Cell) -> Option<f32> {
        self.index(cell).map(|idx| self.values[idx])
    }

    pub fn is_reached(&self, cell: Cell) -> bool {
        self.value_at(cell).is_some_and(|v| v < UNREACHABLE)
    }

    /// Set a seed cell to 0. Walls and cells outside the grid are ignored.
    pub fn seed(&mut self, grid: &DungeonGrid, cell: Cell) -> bool {
        match self.index(cell) {
            Some(idx) if grid.is_walkable(cell) => {
                self.values[idx] = 0.0;
                true
            }
            _ => false,
        }
    }

    /// Relax to the fixed point. Returns the number of sweeps, including the
    /// final one that changed nothing.
    pub fn relax(&mut self, grid: &DungeonGrid) -> usize {
        debug_assert_eq!((self.width, self.height), (grid.width, grid.height));
        let mut sweeps = 0;
        loop {
            sweeps += 1;
            let mut changed = false;
            for y in 0..self.height as i32 {
                for x in 0..self.width as i32 {
                    let cell = Cell::new(x, y);
                    if !grid.is_walkable(cell) {
                        continue;
                    }
                    let idx = y as usize * self.width + x as usize;
                    let current = self.values[idx];
                    let min_val = self.min_floor_neighbor(grid, cell).map_or(current, |n| n.min(current));
                    let relaxed = min_val + 1.0;
                    if min_val < current - 1.0 && relaxed < current {
                        self.values[idx] = relaxed;
                        changed = true;
                    }
                }
            }
            if !changed {
                return sweeps;
            }
        }
    }

    fn min_floor_neighbor(&self, grid: &DungeonGrid, cell: Cell) -> Option<f32> {
        cell.neighbors()
            .into_iter()
            .filter(|n| grid.is_walkable(*n))
            .filter_map(|n| self.value_at(n))
            .reduce(f32::min)
    }

    /// Negate and scale every reached value, then relax again.
    ///
    /// Sentinel cells are left alone; they belong to components no seed
    /// reaches, whose neighbours are all sentinels too, so relaxing never
    /// moves them.
    pub fn into_flee(mut self, grid: &DungeonGrid, flee_factor: f32) -> Self {
        for value in &mut self.values {
            if *value < UNREACHABLE {
                *value *= -flee_factor;
            }
        }
        self.relax(grid);
        self
    }

    /// Floor neighbour with the lowest value strictly below this cell's.
    ///
    /// Neighbours are compared in +x, -x, +y, -y order; the first minimum
    /// wins. `None` at a local minimum (a seed) or for unreached cells.
    pub fn descent_step(&self, grid: &DungeonGrid, cell: Cell) -> Option<Cell> {
        let current = self.value_at(cell)?;
        if current >= UNREACHABLE {
            return None;
        }
        let mut best: Option<(Cell, f32)> = None;
        for next in cell.neighbors() {
            if !grid.is_walkable(next) {
                continue;
            }
            let Some(value) = self.value_at(next) else { continue };
            if value < current && best.is_none_or(|(_, b)| value < b) {
                best = Some((next, value));
            }
        }
        best.map(|(next, _)| next)
    }
}

/// Step-distance field from any of `seeds` over the floor of `grid`.
#[profile(2)]
pub fn generate_flow_field(grid: &DungeonGrid, seeds: &[Cell]) -> FlowField {
    let mut field = FlowField::unreached(grid);
    for &seed in seeds {
        field.seed(grid, seed);
    }
    field.relax(grid);
    field
}
