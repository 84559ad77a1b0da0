use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use super::error::GridError;
use super::fixed_math::{FixedNum, FixedVec2};

/// Default world units per tile.
pub const DEFAULT_TILE_SIZE: f32 = 64.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Floor,
}

impl TileKind {
    fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '#' => Some(TileKind::Wall),
            ' ' | '.' => Some(TileKind::Floor),
            _ => None,
        }
    }
}

/// Integer grid coordinate.
///
/// Signed so that neighbours of border cells (and positions left of or above
/// the map) are representable and can be rejected instead of wrapping.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Orthogonal neighbours in expansion order: +x, -x, +y, -y.
    #[inline]
    pub fn neighbors(self) -> [Cell; 4] {
        [
            Cell::new(self.x + 1, self.y),
            Cell::new(self.x - 1, self.y),
            Cell::new(self.x, self.y + 1),
            Cell::new(self.x, self.y - 1),
        ]
    }

    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn is_adjacent(self, other: Cell) -> bool {
        self.manhattan(other) == 1
    }
}

/// The static dungeon layout (wall / floor tiles).
///
/// Read-only to every search in this crate. Replacing or mutating the
/// resource invalidates the portal graph (see `PathfindingPlugin`).
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DungeonGrid {
    pub width: usize,
    pub height: usize,
    /// Row-major, `width * height` entries.
    pub tiles: Vec<TileKind>,
    pub tile_size: FixedNum,
}

impl DungeonGrid {
    /// All-floor grid.
    pub fn new(width: usize, height: usize, tile_size: FixedNum) -> Self {
        Self {
            width,
            height,
            tiles: vec![TileKind::Floor; width * height],
            tile_size,
        }
    }

    /// Parse a text layout: `#` is a wall, space or `.` is floor.
    ///
    /// Every row must have the same length. Leading and trailing empty lines
    /// are ignored so layouts can be written as multi-line string literals.
    pub fn from_ascii(layout: &str, tile_size: FixedNum) -> Result<Self, GridError> {
        let rows: Vec<&str> = layout
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .skip_while(|line| line.is_empty())
            .collect();
        let rows: Vec<&str> = match rows.iter().rposition(|line| !line.is_empty()) {
            Some(last) => rows[..=last].to_vec(),
            None => return Err(GridError::Empty),
        };

        let width = rows[0].chars().count();
        let mut tiles = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(GridError::RaggedRow { row: y, expected: width, found });
            }
            for (x, glyph) in row.chars().enumerate() {
                let tile = TileKind::from_glyph(glyph).ok_or(GridError::UnknownTile { glyph, x, y })?;
                tiles.push(tile);
            }
        }

        Ok(Self { width, height: rows.len(), tiles, tile_size })
    }

    #[inline]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < self.width && (cell.y as usize) < self.height
    }

    #[inline]
    pub fn index_of(&self, cell: Cell) -> Option<usize> {
        self.in_bounds(cell).then(|| cell.y as usize * self.width + cell.x as usize)
    }

    #[inline]
    pub fn cell_at(&self, index: usize) -> Cell {
        Cell::new((index % self.width) as i32, (index / self.width) as i32)
    }

    /// Tile kind at `cell`; anything outside the grid reads as wall.
    #[inline]
    pub fn tile(&self, cell: Cell) -> TileKind {
        self.index_of(cell).map_or(TileKind::Wall, |idx| self.tiles[idx])
    }

    #[inline]
    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.tile(cell) == TileKind::Floor
    }

    /// Returns `false` (and changes nothing) when `cell` is outside the grid.
    pub fn set_tile(&mut self, cell: Cell, kind: TileKind) -> bool {
        match self.index_of(cell) {
            Some(idx) => {
                self.tiles[idx] = kind;
                true
            }
            None => false,
        }
    }

    /// Map a world position to the containing cell (divide by tile size, floor).
    ///
    /// `None` outside the grid, and for every position when the tile size is
    /// not positive.
    pub fn world_to_cell(&self, pos: FixedVec2) -> Option<Cell> {
        if self.tile_size <= FixedNum::ZERO {
            return None;
        }
        let x = pos.x.checked_div(self.tile_size)?.floor().to_num::<i64>();
        let y = pos.y.checked_div(self.tile_size)?.floor().to_num::<i64>();
        let cell = Cell::new(i32::try_from(x).ok()?, i32::try_from(y).ok()?);
        self.in_bounds(cell).then_some(cell)
    }

    /// World position of the center of `cell`.
    pub fn cell_to_world(&self, cell: Cell) -> FixedVec2 {
        let half = self.tile_size / FixedNum::from_num(2);
        FixedVec2::new(
            FixedNum::from_num(cell.x) * self.tile_size + half,
            FixedNum::from_num(cell.y) * self.tile_size + half,
        )
    }

    pub fn floor_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| **tile == TileKind::Floor)
            .map(|(idx, _)| self.cell_at(idx))
    }

    /// Pick a uniformly random floor tile and return a position just inside
    /// its top-left corner. `None` when the grid has no floor.
    pub fn random_floor_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<FixedVec2> {
        let floors: Vec<Cell> = self.floor_cells().collect();
        if floors.is_empty() {
            return None;
        }
        let cell = floors[rng.random_range(0..floors.len())];
        let inset = FixedNum::from_num(0.01);
        Some(FixedVec2::new(
            (FixedNum::from_num(cell.x) + inset) * self.tile_size,
            (FixedNum::from_num(cell.y) + inset) * self.tile_size,
        ))
    }

    pub fn is_position_walkable(&self, pos: FixedVec2) -> bool {
        self.world_to_cell(pos).is_some_and(|cell| self.is_walkable(cell))
    }
}

impl Default for DungeonGrid {
    fn default() -> Self {
        Self::new(0, 0, FixedNum::from_num(DEFAULT_TILE_SIZE))
    }
}
