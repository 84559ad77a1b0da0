//! Tests for the cell search, portal graph construction and path assembly.
//!
//! Grids are built with a tile size of 64 so world positions look like the
//! ones agents actually use.

use super::*;
use crate::nav::dungeon::{Cell, DungeonGrid, TileKind};
use crate::nav::fixed_math::{FixedNum, FixedVec2};

fn open_grid(width: usize, height: usize) -> DungeonGrid {
    DungeonGrid::new(width, height, FixedNum::from_num(64))
}

fn add_wall(grid: &mut DungeonGrid, x: i32, y: i32, width: i32, height: i32) {
    for dy in 0..height {
        for dx in 0..width {
            grid.set_tile(Cell::new(x + dx, y + dy), TileKind::Wall);
        }
    }
}

fn assert_valid_path(grid: &DungeonGrid, path: &[Cell], bounds: SearchBounds) {
    for cell in path {
        assert!(grid.is_walkable(*cell), "path crosses wall at {:?}", cell);
        assert!(bounds.contains(*cell), "path leaves bounds at {:?}", cell);
    }
    for pair in path.windows(2) {
        assert!(pair[0].is_adjacent(pair[1]), "{:?} -> {:?} is not a single step", pair[0], pair[1]);
    }
}

/// Two 10x10 regions side by side, joined by a 3-cell opening at y = 4..=6.
fn two_rooms() -> DungeonGrid {
    let mut grid = open_grid(20, 10);
    add_wall(&mut grid, 9, 0, 1, 4);
    add_wall(&mut grid, 9, 7, 1, 3);
    grid
}

// ============================================================================
// Local A*
// ============================================================================

#[test]
fn test_open_grid_path_is_manhattan() {
    let grid = open_grid(10, 10);
    let path = find_path_grid(&grid, Cell::new(0, 0), Cell::new(9, 9));

    assert_eq!(path.len(), 19, "18 steps plus the start cell");
    assert_eq!(path.first(), Some(&Cell::new(0, 0)));
    assert_eq!(path.last(), Some(&Cell::new(9, 9)));
    assert_valid_path(&grid, &path, SearchBounds::full(&grid).unwrap());
}

#[test]
fn test_start_equals_goal_is_single_cell() {
    let grid = open_grid(5, 5);
    assert_eq!(find_path_grid(&grid, Cell::new(2, 2), Cell::new(2, 2)), vec![Cell::new(2, 2)]);
}

#[test]
fn test_start_outside_grid_is_empty() {
    let grid = open_grid(5, 5);
    assert!(find_path_grid(&grid, Cell::new(-1, 0), Cell::new(2, 2)).is_empty());
    assert!(find_path_grid(&grid, Cell::new(5, 0), Cell::new(2, 2)).is_empty());
}

#[test]
fn test_start_on_wall_is_empty() {
    let mut grid = open_grid(8, 5);
    grid.set_tile(Cell::new(2, 2), TileKind::Wall);

    assert!(find_path_grid(&grid, Cell::new(2, 2), Cell::new(5, 2)).is_empty());
    assert!(find_path_grid(&grid, Cell::new(2, 2), Cell::new(2, 2)).is_empty());
    assert!(find_path_grid(&grid, Cell::new(5, 2), Cell::new(2, 2)).is_empty());
}

#[test]
fn test_enclosed_cell_is_unreachable() {
    let mut grid = open_grid(7, 7);
    grid.set_tile(Cell::new(3, 2), TileKind::Wall);
    grid.set_tile(Cell::new(3, 4), TileKind::Wall);
    grid.set_tile(Cell::new(2, 3), TileKind::Wall);
    grid.set_tile(Cell::new(4, 3), TileKind::Wall);

    for start in [Cell::new(0, 0), Cell::new(6, 6), Cell::new(3, 1)] {
        assert!(find_path_grid(&grid, start, Cell::new(3, 3)).is_empty(), "reached enclosed cell from {:?}", start);
    }
}

#[test]
fn test_search_stays_inside_bounds() {
    // Wall splits the 10x10 area; the only way around is below y = 5.
    let mut grid = open_grid(10, 10);
    add_wall(&mut grid, 5, 0, 1, 8);

    let bounds = SearchBounds::new(Cell::new(0, 0), Cell::new(9, 4));
    assert!(find_path_local(&grid, Cell::new(2, 2), Cell::new(8, 2), bounds).is_empty());

    let wide = SearchBounds::new(Cell::new(0, 0), Cell::new(9, 9));
    let path = find_path_local(&grid, Cell::new(2, 2), Cell::new(8, 2), wide);
    assert!(!path.is_empty());
    assert_valid_path(&grid, &path, wide);
}

#[test]
fn test_bounds_are_clipped_to_grid() {
    let grid = open_grid(4, 4);
    let oversized = SearchBounds::new(Cell::new(-5, -5), Cell::new(50, 50));
    let path = find_path_local(&grid, Cell::new(0, 0), Cell::new(3, 3), oversized);
    assert_eq!(path.len(), 7);

    let outside = SearchBounds::new(Cell::new(10, 10), Cell::new(12, 12));
    assert!(find_path_local(&grid, Cell::new(0, 0), Cell::new(3, 3), outside).is_empty());
}

#[test]
fn test_local_search_is_deterministic() {
    let mut grid = open_grid(12, 12);
    add_wall(&mut grid, 3, 2, 6, 1);
    add_wall(&mut grid, 6, 5, 1, 5);

    let first = find_path_grid(&grid, Cell::new(0, 0), Cell::new(11, 11));
    for _ in 0..5 {
        assert_eq!(find_path_grid(&grid, Cell::new(0, 0), Cell::new(11, 11)), first);
    }
}

#[test]
fn test_random_grids_produce_valid_paths() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);

    for _ in 0..40 {
        let mut grid = open_grid(16, 16);
        for cell in (0..16 * 16).map(|i| Cell::new(i % 16, i / 16)) {
            if rng.f32() < 0.3 {
                grid.set_tile(cell, TileKind::Wall);
            }
        }
        let floors: Vec<Cell> = grid.floor_cells().collect();
        if floors.len() < 2 {
            continue;
        }
        let from = floors[rng.usize(..floors.len())];
        let to = floors[rng.usize(..floors.len())];
        let bounds = SearchBounds::new(Cell::new(2, 2), Cell::new(13, 13));

        let path = find_path_local(&grid, from, to, bounds);
        if path.is_empty() {
            continue;
        }
        assert_eq!(path[0], from);
        assert_eq!(*path.last().unwrap(), to);
        assert_valid_path(&grid, &path, bounds);
    }
}

#[test]
fn test_wall_free_random_pairs_match_manhattan() {
    let grid = open_grid(20, 20);
    let mut rng = fastrand::Rng::with_seed(7);

    for _ in 0..100 {
        let from = Cell::new(rng.i32(0..20), rng.i32(0..20));
        let to = Cell::new(rng.i32(0..20), rng.i32(0..20));
        let path = find_path_grid(&grid, from, to);
        assert_eq!(path.len() as u32, from.manhattan(to) + 1, "{:?} -> {:?}", from, to);
    }
}

// ============================================================================
// Portal detection and connection
// ============================================================================

#[test]
fn test_single_region_has_no_portals() {
    let grid = open_grid(10, 10);
    let graph = build_portal_graph(&grid, 10);

    assert_eq!(graph.region_count(), 1);
    assert!(graph.portals.is_empty());
    assert_eq!(graph.stats().isolated_regions, 1);
}

#[test]
fn test_open_grid_portals_and_region_lists() {
    let grid = open_grid(20, 20);
    let graph = build_portal_graph(&grid, 10);

    assert_eq!(graph.portals.len(), 4);
    // Region 1 scans its left border, region 2 its top, region 3 both.
    assert_eq!((graph.portals[0].start, graph.portals[0].end), (Cell::new(9, 0), Cell::new(10, 9)));
    assert_eq!(graph.portals[0].axis, PortalAxis::Left);
    assert_eq!((graph.portals[1].start, graph.portals[1].end), (Cell::new(0, 9), Cell::new(9, 10)));
    assert_eq!(graph.portals[1].axis, PortalAxis::Top);
    assert_eq!((graph.portals[2].start, graph.portals[2].end), (Cell::new(10, 9), Cell::new(19, 10)));
    assert_eq!((graph.portals[3].start, graph.portals[3].end), (Cell::new(9, 10), Cell::new(10, 19)));

    assert_eq!(graph.portals_of(0), &[0, 1]);
    assert_eq!(graph.portals_of(1), &[0, 2]);
    assert_eq!(graph.portals_of(2), &[1, 3]);
    assert_eq!(graph.portals_of(3), &[2, 3]);

    // Footprints of portals 0 and 1 share the corner cell (9, 9) of region 0.
    assert_eq!(graph.portals[0].connection_to(1).map(|c| c.cost), Some(1.0));
    assert_eq!(graph.portals[1].connection_to(0).map(|c| c.cost), Some(1.0));
}

#[test]
fn test_wall_splits_border_into_two_portals() {
    let mut grid = open_grid(20, 10);
    grid.set_tile(Cell::new(9, 5), TileKind::Wall);
    let graph = build_portal_graph(&grid, 10);

    assert_eq!(graph.portals.len(), 2);
    assert_eq!((graph.portals[0].start, graph.portals[0].end), (Cell::new(9, 0), Cell::new(10, 4)));
    assert_eq!((graph.portals[1].start, graph.portals[1].end), (Cell::new(9, 6), Cell::new(10, 9)));
    assert_eq!(graph.portals[0].span(), 5);
    assert_eq!(graph.portals[1].span(), 4);

    // Connected once per shared region: around the wall in region 0 (9,4)
    // -> (8,4) -> (8,5) -> (8,6) -> (9,6), straight down x = 10 in region 1.
    let costs: Vec<f32> = graph.portals[0].connections.iter().map(|c| c.cost).collect();
    assert_eq!(costs, vec![5.0, 3.0]);
    assert_eq!(graph.stats().connection_count, 2);
}

#[test]
fn test_unreachable_probe_leaves_pair_unconnected() {
    // A wall row cuts region 0 in half, so the two portals only meet in region 1.
    let mut grid = open_grid(20, 10);
    add_wall(&mut grid, 0, 5, 10, 1);
    let graph = build_portal_graph(&grid, 10);

    assert_eq!(graph.portals.len(), 2);
    assert_eq!(graph.portals[0].connections.len(), 1);
    assert_eq!(graph.portals[0].connections[0].target, 1);
    assert_eq!(graph.portals[0].connections[0].cost, 3.0);

    assert!(connect_region(&graph, &grid, 0).is_empty());
    assert_eq!(connect_region(&graph, &grid, 1), vec![(0, 1, 3.0)]);
}

#[test]
fn test_enclosed_region_has_no_portals() {
    let mut grid = open_grid(30, 10);
    add_wall(&mut grid, 9, 0, 2, 10);
    add_wall(&mut grid, 19, 0, 2, 10);
    let graph = build_portal_graph(&grid, 10);

    assert!(graph.portals.is_empty());
    assert_eq!(graph.stats().isolated_regions, 3);
}

#[test]
fn test_ragged_final_regions() {
    let grid = open_grid(15, 12);
    let graph = build_portal_graph(&grid, 10);

    assert_eq!((graph.regions_wide, graph.regions_high), (2, 2));
    assert_eq!(graph.region_bounds(3), SearchBounds::new(Cell::new(10, 10), Cell::new(14, 11)));
    assert_eq!(graph.region_of(Cell::new(14, 11)), Some(3));
    assert_eq!(graph.region_of(Cell::new(15, 0)), None);

    // Region 1's left border covers y = 0..=9, region 3's y = 10..=11.
    let left_spans: Vec<usize> = graph
        .portals
        .iter()
        .filter(|p| p.axis == PortalAxis::Left)
        .map(|p| p.span())
        .collect();
    assert_eq!(left_spans, vec![10, 2]);
}

#[test]
fn test_zero_super_tile_size_is_clamped() {
    let grid = open_grid(3, 3);
    let graph = build_portal_graph(&grid, 0);
    assert_eq!(graph.super_tile_size, 1);
    assert_eq!(graph.region_count(), 9);
}

#[test]
fn test_rebuild_is_identical() {
    let mut grid = open_grid(30, 30);
    add_wall(&mut grid, 4, 4, 15, 1);
    add_wall(&mut grid, 12, 8, 1, 15);
    add_wall(&mut grid, 20, 20, 6, 6);

    assert_eq!(build_portal_graph(&grid, 10), build_portal_graph(&grid, 10));
}

#[test]
fn test_connection_costs_match_direct_probes() {
    let mut rng = fastrand::Rng::with_seed(1234);

    for _ in 0..5 {
        let mut grid = open_grid(30, 30);
        for cell in (0..30 * 30).map(|i| Cell::new(i % 30, i / 30)) {
            if rng.f32() < 0.25 {
                grid.set_tile(cell, TileKind::Wall);
            }
        }
        let graph = build_portal_graph(&grid, 10);

        for region in 0..graph.region_count() {
            let bounds = graph.region_bounds(region);
            for (first, second, cost) in connect_region(&graph, &grid, region) {
                let from = graph.portals[first].footprint().intersect(&bounds).unwrap().min;
                let to = graph.portals[second].footprint().intersect(&bounds).unwrap().min;
                let direct = find_path_local(&grid, from, to, bounds);

                assert!(!direct.is_empty() || from == to, "connected portals {} and {} not reachable", first, second);
                assert!(direct.len() as f32 >= cost, "probe {} shorter than recorded {}", direct.len(), cost);
            }
        }
    }
}

// ============================================================================
// Portal-graph A*
// ============================================================================

#[test]
fn test_portal_path_through_chain() {
    let grid = open_grid(30, 10);
    let graph = build_portal_graph(&grid, 10);
    assert_eq!(graph.portals.len(), 2);

    let path = find_portal_path(&graph, 0, 1);
    assert_eq!(path.portals, vec![0, 1]);
    assert_eq!(path.cost, 10.0);

    let same = find_portal_path(&graph, 1, 1);
    assert_eq!(same.portals, vec![1]);
    assert_eq!(same.cost, 0.0);
}

#[test]
fn test_portal_path_unreachable_is_infinite() {
    // Two separate corridors across the same border, never joined.
    let mut grid = open_grid(20, 10);
    add_wall(&mut grid, 0, 5, 20, 1);
    let graph = build_portal_graph(&grid, 10);
    assert_eq!(graph.portals.len(), 2);

    let path = find_portal_path(&graph, 0, 1);
    assert!(!path.is_found());
    assert_eq!(path.cost, f32::INFINITY);
    assert_eq!(find_portal_path(&graph, 0, 99), PortalPath::none());
}

// ============================================================================
// Path assembly
// ============================================================================

#[test]
fn test_same_region_uses_direct_path() {
    let grid = open_grid(10, 10);
    let graph = build_portal_graph(&grid, 10);
    let start = grid.cell_to_world(Cell::new(0, 0));
    let goal = grid.cell_to_world(Cell::new(9, 9));

    let path = find_path(&graph, &grid, start, goal);
    assert_eq!(path.len(), 19);
    assert_eq!(path[0], start);
    assert_eq!(*path.last().unwrap(), goal);
}

#[test]
fn test_cross_region_path_routes_through_opening() {
    let grid = two_rooms();
    let graph = build_portal_graph(&grid, 10);
    assert_eq!(graph.portals.len(), 1);
    assert_eq!((graph.portals[0].start, graph.portals[0].end), (Cell::new(9, 4), Cell::new(10, 6)));

    let from = Cell::new(2, 2);
    let to = Cell::new(17, 7);
    let path = find_path(&graph, &grid, grid.cell_to_world(from), grid.cell_to_world(to));

    let start_leg = find_path_local(&grid, from, Cell::new(9, 4), graph.region_bounds(0));
    let end_leg = find_path_local(&grid, to, Cell::new(10, 6), graph.region_bounds(1));
    let mid = find_portal_path(&graph, 0, 0);
    assert_eq!((start_leg.len(), mid.cost, end_leg.len()), (10, 0.0, 9));
    assert_eq!(path.len(), start_leg.len() + mid.portals.len() + end_leg.len());

    assert_eq!(path[0], grid.cell_to_world(from));
    assert_eq!(path[9], grid.cell_to_world(Cell::new(9, 4)));
    assert_eq!(path[10], FixedVec2::from_f32(10.0 * 64.0, 5.5 * 64.0));
    assert_eq!(path[11], grid.cell_to_world(Cell::new(10, 6)));
    assert_eq!(*path.last().unwrap(), grid.cell_to_world(to));
}

#[test]
fn test_same_region_blocked_detours_through_neighbour() {
    // Region 0 is split by a wall at x = 5; region 1 below is open.
    let mut grid = open_grid(10, 20);
    add_wall(&mut grid, 5, 0, 1, 10);
    let graph = build_portal_graph(&grid, 10);
    assert_eq!(graph.portals.len(), 2);

    let from = Cell::new(3, 8);
    let to = Cell::new(7, 8);
    assert!(find_path_local(&grid, from, to, graph.region_bounds(0)).is_empty());

    let path = find_path(&graph, &grid, grid.cell_to_world(from), grid.cell_to_world(to));
    let ts = 64.0;
    assert_eq!(
        path,
        vec![
            grid.cell_to_world(from),
            grid.cell_to_world(Cell::new(3, 9)),
            FixedVec2::from_f32(2.5 * ts, 10.0 * ts),
            FixedVec2::from_f32(8.0 * ts, 10.0 * ts),
            grid.cell_to_world(Cell::new(7, 9)),
            grid.cell_to_world(to),
        ]
    );
}

#[test]
fn test_unreachable_or_off_grid_is_empty() {
    let mut grid = open_grid(20, 10);
    add_wall(&mut grid, 9, 0, 2, 10);
    let graph = build_portal_graph(&grid, 10);

    let start = grid.cell_to_world(Cell::new(1, 1));
    assert!(find_path(&graph, &grid, start, grid.cell_to_world(Cell::new(15, 5))).is_empty());
    assert!(find_path(&graph, &grid, start, FixedVec2::from_f32(-10.0, 5.0)).is_empty());
    assert!(find_path(&graph, &grid, FixedVec2::from_f32(5000.0, 5.0), start).is_empty());
}

#[test]
fn test_agent_standing_on_wall_gets_no_path() {
    let mut grid = open_grid(20, 10);
    grid.set_tile(Cell::new(2, 2), TileKind::Wall);
    let graph = build_portal_graph(&grid, 10);

    let on_wall = grid.cell_to_world(Cell::new(2, 2));
    assert!(find_path(&graph, &grid, on_wall, grid.cell_to_world(Cell::new(5, 2))).is_empty());
    assert!(find_path(&graph, &grid, on_wall, grid.cell_to_world(Cell::new(15, 5))).is_empty());
}

#[test]
fn test_zero_tile_size_gives_no_path() {
    let grid = DungeonGrid::new(10, 10, FixedNum::ZERO);
    let graph = build_portal_graph(&grid, 10);
    let pos = FixedVec2::from_f32(3.0, 3.0);
    assert!(find_path(&graph, &grid, pos, pos).is_empty());
}

#[test]
fn test_graph_for_other_grid_size_gives_no_path() {
    let grid = open_grid(20, 10);
    let graph = build_portal_graph(&open_grid(10, 10), 10);
    let start = grid.cell_to_world(Cell::new(1, 1));
    assert!(find_path(&graph, &grid, start, start).is_empty());
}
