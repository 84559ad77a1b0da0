use bevy::prelude::*;
use rustc_hash::FxHashMap;
use crate::nav::dungeon::{Cell, DungeonGrid};
use crate::nav::fixed_math::FixedVec2;
use crate::nav::profiling::profile;
use super::astar::find_path_local;
use super::portal_astar::find_portal_path;
use super::portal_graph::PortalGraph;
use super::types::{PortalId, SearchBounds};

/// Shortest path from `tile` to any cell of a portal's footprint inside `bounds`.
///
/// Footprint cells are probed rows-first; probing stops at the first cell
/// that cannot be reached, keeping the best leg found before it.
fn leg_to_portal(grid: &DungeonGrid, graph: &PortalGraph, tile: Cell, portal: PortalId, bounds: SearchBounds) -> Vec<Cell> {
    let Some(targets) = graph.portals[portal].footprint().intersect(&bounds) else {
        return Vec::new();
    };

    let mut best: Vec<Cell> = Vec::new();
    let mut best_len = usize::MAX;
    for target in targets.cells() {
        let path = find_path_local(grid, tile, target, bounds);
        if path.is_empty() && tile != target {
            break;
        }
        if path.len() < best_len {
            best_len = path.len();
            best = path;
        }
    }
    best
}

/// Hierarchical path between two world positions.
///
/// Start and goal in the same region first try a direct search bounded to
/// that region. Every (start-region portal, goal-region portal) combination
/// is then scored as `leg + portal path cost + leg`, in cells, and the first
/// strict minimum wins. Cells come out at their world centers and portals at
/// the center of their footprint. An empty result means no path.
#[profile(2)]
pub fn find_path(graph: &PortalGraph, grid: &DungeonGrid, start_pos: FixedVec2, goal_pos: FixedVec2) -> Vec<FixedVec2> {
    let (Some(tile_from), Some(tile_to)) = (grid.world_to_cell(start_pos), grid.world_to_cell(goal_pos)) else {
        return Vec::new();
    };
    if !graph.covers(grid) {
        warn!(
            "[PATHFINDING] Portal graph is for a {}x{} grid, dungeon is {}x{}",
            graph.grid_width, graph.grid_height, grid.width, grid.height
        );
        return Vec::new();
    }
    let (Some(from_region), Some(to_region)) = (graph.region_of(tile_from), graph.region_of(tile_to)) else {
        return Vec::new();
    };
    let from_bounds = graph.region_bounds(from_region);
    let to_bounds = graph.region_bounds(to_region);
    let to_world = |cells: &[Cell]| cells.iter().map(|&c| grid.cell_to_world(c)).collect::<Vec<_>>();

    let mut min_len = f32::MAX;
    let mut min_path = Vec::new();

    if from_region == to_region {
        let direct = find_path_local(grid, tile_from, tile_to, from_bounds);
        if !direct.is_empty() {
            min_len = direct.len() as f32;
            min_path = to_world(&direct);
        }
    }

    let mut start_legs: FxHashMap<PortalId, Vec<Cell>> = FxHashMap::default();
    let mut end_legs: FxHashMap<PortalId, Vec<Cell>> = FxHashMap::default();

    for &entry in graph.portals_of(from_region) {
        for &exit in graph.portals_of(to_region) {
            let start = start_legs
                .entry(entry)
                .or_insert_with(|| leg_to_portal(grid, graph, tile_from, entry, from_bounds));
            if start.is_empty() {
                continue;
            }
            let end = end_legs
                .entry(exit)
                .or_insert_with(|| leg_to_portal(grid, graph, tile_to, exit, to_bounds));
            if end.is_empty() {
                continue;
            }
            let mid = find_portal_path(graph, entry, exit);
            if !mid.is_found() {
                continue;
            }

            let len = start.len() as f32 + mid.cost + end.len() as f32;
            if len < min_len {
                min_len = len;
                let mut path = to_world(start.as_slice());
                path.extend(mid.portals.iter().map(|&p| graph.portals[p].world_center(grid.tile_size)));
                path.extend(end.iter().rev().map(|&c| grid.cell_to_world(c)));
                min_path = path;
            }
        }
    }

    min_path
}
