use std::hash::{Hash, Hasher};
use bevy::prelude::*;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use crate::nav::dungeon::{Cell, DungeonGrid};
use super::types::{Portal, PortalId, RegionId, SearchBounds};

/// Portals between super-tile regions and their intra-region connections.
///
/// Built once per dungeon layout and read-only afterwards. Regions are laid
/// out row-major, `regions_wide × regions_high`; the last column and row are
/// clipped to the grid when its size is not a multiple of `super_tile_size`.
#[derive(Resource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortalGraph {
    pub super_tile_size: usize,
    pub grid_width: usize,
    pub grid_height: usize,
    pub regions_wide: usize,
    pub regions_high: usize,
    /// Fingerprint of the tiles the graph was built from.
    pub grid_fingerprint: u64,
    pub portals: Vec<Portal>,
    /// Per region, the portals on its border in discovery order.
    pub region_portals: Vec<Vec<PortalId>>,
}

impl PortalGraph {
    /// Empty graph (no portals yet) with the region lattice for `grid`.
    pub fn new(grid: &DungeonGrid, super_tile_size: usize) -> Self {
        let super_tile_size = super_tile_size.max(1);
        let regions_wide = grid.width.div_ceil(super_tile_size);
        let regions_high = grid.height.div_ceil(super_tile_size);
        Self {
            super_tile_size,
            grid_width: grid.width,
            grid_height: grid.height,
            regions_wide,
            regions_high,
            grid_fingerprint: grid_fingerprint(grid),
            portals: Vec::new(),
            region_portals: vec![Vec::new(); regions_wide * regions_high],
        }
    }

    pub fn region_count(&self) -> usize {
        self.regions_wide * self.regions_high
    }

    /// Region containing `cell`, or `None` outside the grid.
    pub fn region_of(&self, cell: Cell) -> Option<RegionId> {
        if cell.x < 0 || cell.y < 0 || cell.x as usize >= self.grid_width || cell.y as usize >= self.grid_height {
            return None;
        }
        let rx = cell.x as usize / self.super_tile_size;
        let ry = cell.y as usize / self.super_tile_size;
        Some(ry * self.regions_wide + rx)
    }

    /// Cell rectangle of a region, clipped to the grid.
    pub fn region_bounds(&self, region: RegionId) -> SearchBounds {
        let s = self.super_tile_size;
        let rx = region % self.regions_wide;
        let ry = region / self.regions_wide;
        let min = Cell::new((rx * s) as i32, (ry * s) as i32);
        let max = Cell::new(
            (((rx + 1) * s).min(self.grid_width) - 1) as i32,
            (((ry + 1) * s).min(self.grid_height) - 1) as i32,
        );
        SearchBounds::new(min, max)
    }

    pub fn portals_of(&self, region: RegionId) -> &[PortalId] {
        self.region_portals.get(region).map_or(&[], Vec::as_slice)
    }

    /// Same dimensions as `grid`. Cheap enough to check on every query.
    pub fn covers(&self, grid: &DungeonGrid) -> bool {
        self.grid_width == grid.width && self.grid_height == grid.height
    }

    /// Built from exactly this layout.
    pub fn matches(&self, grid: &DungeonGrid) -> bool {
        self.covers(grid) && self.grid_fingerprint == grid_fingerprint(grid)
    }

    pub fn stats(&self) -> PortalGraphStats {
        let connection_count = self.portals.iter().map(|p| p.connections.len()).sum::<usize>() / 2;
        let isolated_regions = self.region_portals.iter().filter(|list| list.is_empty()).count();
        PortalGraphStats {
            region_count: self.region_count(),
            portal_count: self.portals.len(),
            connection_count,
            isolated_regions,
        }
    }
}

pub fn grid_fingerprint(grid: &DungeonGrid) -> u64 {
    let mut hasher = FxHasher::default();
    grid.width.hash(&mut hasher);
    grid.height.hash(&mut hasher);
    grid.tiles.hash(&mut hasher);
    hasher.finish()
}

/// Summary counts, for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalGraphStats {
    pub region_count: usize,
    pub portal_count: usize,
    /// Bidirectional connections, each counted once.
    pub connection_count: usize,
    /// Regions with no portal on their border.
    pub isolated_regions: usize,
}
