use bevy::prelude::*;
use crate::nav::config::NavConfig;
use crate::nav::dungeon::{Cell, DungeonGrid};
use crate::nav::profiling::profile;
use super::astar::find_path_local;
use super::portal_graph::PortalGraph;
use super::types::{Portal, PortalAxis, PortalConnection, PortalId, RegionId, SearchBounds};

/// Region edge length actually used for a configured value; 0 becomes 1.
pub fn effective_super_tile_size(configured: usize) -> usize {
    if configured == 0 {
        warn!("[PORTALS] super_tile_size 0 is invalid, using 1");
        1
    } else {
        configured
    }
}

/// One-shot portal graph build: detect every portal, then connect every region.
#[profile(50)]
pub fn build_portal_graph(grid: &DungeonGrid, super_tile_size: usize) -> PortalGraph {
    let mut graph = PortalGraph::new(grid, effective_super_tile_size(super_tile_size));
    detect_portals(&mut graph, grid);
    for region in 0..graph.region_count() {
        let edges = connect_region(&graph, grid, region);
        apply_connections(&mut graph, &edges);
    }
    graph
}

/// Scan every region's top and left border, row-major.
pub fn detect_portals(graph: &mut PortalGraph, grid: &DungeonGrid) {
    for region in 0..graph.region_count() {
        detect_region_portals(graph, grid, region);
    }
}

/// Register the portals on the top and left border of one region.
///
/// Bottom and right borders belong to the regions below and to the right, so
/// every shared border is scanned exactly once when regions are visited in
/// row-major order.
pub fn detect_region_portals(graph: &mut PortalGraph, grid: &DungeonGrid, region: RegionId) {
    let bounds = graph.region_bounds(region);
    let rx = region % graph.regions_wide;
    let ry = region / graph.regions_wide;

    if ry > 0 {
        let y = bounds.min.y;
        let spans = walkable_runs(bounds.min.x..=bounds.max.x, |x| {
            grid.is_walkable(Cell::new(x, y)) && grid.is_walkable(Cell::new(x, y - 1))
        });
        for (from, to) in spans {
            push_portal(graph, Portal {
                start: Cell::new(from, y - 1),
                end: Cell::new(to, y),
                axis: PortalAxis::Top,
                regions: [region, region - graph.regions_wide],
                connections: Default::default(),
            });
        }
    }

    if rx > 0 {
        let x = bounds.min.x;
        let spans = walkable_runs(bounds.min.y..=bounds.max.y, |y| {
            grid.is_walkable(Cell::new(x, y)) && grid.is_walkable(Cell::new(x - 1, y))
        });
        for (from, to) in spans {
            push_portal(graph, Portal {
                start: Cell::new(x - 1, from),
                end: Cell::new(x, to),
                axis: PortalAxis::Left,
                regions: [region, region - 1],
                connections: Default::default(),
            });
        }
    }
}

/// Maximal runs of consecutive coordinates where `open` holds.
fn walkable_runs(range: std::ops::RangeInclusive<i32>, open: impl Fn(i32) -> bool) -> Vec<(i32, i32)> {
    let mut runs = Vec::new();
    let mut span: Option<(i32, i32)> = None;
    for i in range {
        if open(i) {
            span = Some(match span {
                Some((from, _)) => (from, i),
                None => (i, i),
            });
        } else if let Some(run) = span.take() {
            runs.push(run);
        }
    }
    if let Some(run) = span {
        runs.push(run);
    }
    runs
}

fn push_portal(graph: &mut PortalGraph, portal: Portal) {
    let id = graph.portals.len();
    let [own, neighbor] = portal.regions;
    graph.region_portals[own].push(id);
    graph.region_portals[neighbor].push(id);
    graph.portals.push(portal);
}

/// Connections between every pair of portals on one region's border.
///
/// Pure with respect to the graph, so regions can be connected in any order
/// (or in parallel) and applied afterwards. Pairs come out in `(i, j)` order
/// over the region's portal list with `i < j`.
pub fn connect_region(graph: &PortalGraph, grid: &DungeonGrid, region: RegionId) -> Vec<(PortalId, PortalId, f32)> {
    let bounds = graph.region_bounds(region);
    let portals = graph.portals_of(region);
    let mut edges = Vec::new();

    for (i, &first) in portals.iter().enumerate() {
        for &second in &portals[i + 1..] {
            if let Some(cost) = probe_cost(grid, &graph.portals[first], &graph.portals[second], bounds) {
                edges.push((first, second, cost));
            }
        }
    }
    edges
}

/// Shortest probe between two portal footprints inside `bounds`, in cells.
///
/// Every cell pair of the two clipped footprints is searched. The pair is
/// unreachable as soon as one probe between distinct cells finds no path.
pub fn probe_cost(grid: &DungeonGrid, first: &Portal, second: &Portal, bounds: SearchBounds) -> Option<f32> {
    let from_cells = first.footprint().intersect(&bounds)?;
    let to_cells = second.footprint().intersect(&bounds)?;

    let mut min_len = usize::MAX;
    for from in from_cells.cells() {
        for to in to_cells.cells() {
            let path = find_path_local(grid, from, to, bounds);
            if path.is_empty() && from != to {
                return None;
            }
            min_len = min_len.min(path.len());
        }
    }
    Some(min_len as f32)
}

pub fn apply_connections(graph: &mut PortalGraph, edges: &[(PortalId, PortalId, f32)]) {
    for &(first, second, cost) in edges {
        graph.portals[first].connections.push(PortalConnection { target: second, cost });
        graph.portals[second].connections.push(PortalConnection { target: first, cost });
    }
}

// ============================================================================
// Incremental build
// ============================================================================

#[derive(Resource, Default)]
pub struct GraphBuildState {
    pub step: GraphBuildStep,
    /// Next region to scan or connect.
    pub cursor: RegionId,
    /// 0.0 to 1.0 over the whole build.
    pub progress: f32,
    /// Graph under construction; moved into the `PortalGraph` resource when done.
    pub pending: PortalGraph,
}

#[derive(Default, PartialEq, Eq, Debug, Clone, Copy)]
pub enum GraphBuildStep {
    #[default]
    Done,
    NotStarted,
    DetectingPortals,
    ConnectingRegions,
}

impl GraphBuildState {
    pub fn is_done(&self) -> bool {
        self.step == GraphBuildStep::Done
    }
}

/// Restart the build whenever the dungeon grid changes.
///
/// A `PortalGraph` that was built from exactly this layout (for example one
/// loaded with the map) is kept; any other graph is stale and removed until
/// the rebuild finishes.
pub(super) fn start_portal_graph_build(
    mut commands: Commands,
    mut build_state: ResMut<GraphBuildState>,
    grid: Res<DungeonGrid>,
    graph: Option<Res<PortalGraph>>,
    config: Res<NavConfig>,
) {
    if let Some(graph) = graph {
        if graph.matches(&grid) {
            info!("[PORTALS] Portal graph ({} portals) is current, skipping build", graph.portals.len());
            build_state.step = GraphBuildStep::Done;
            build_state.progress = 1.0;
            return;
        }
        commands.remove_resource::<PortalGraph>();
    }

    build_state.pending = PortalGraph::new(&grid, effective_super_tile_size(config.super_tile_size));
    build_state.cursor = 0;
    build_state.progress = 0.0;
    build_state.step = GraphBuildStep::NotStarted;
}

pub(super) fn incremental_build_portal_graph(
    mut commands: Commands,
    mut build_state: ResMut<GraphBuildState>,
    grid: Res<DungeonGrid>,
    config: Res<NavConfig>,
) {
    let state = &mut *build_state;
    let region_count = state.pending.region_count();

    match state.step {
        GraphBuildStep::NotStarted => {
            info!("=== PORTAL GRAPH BUILD START ===");
            info!("[PORTALS] Map: {} x {} cells", grid.width, grid.height);
            info!(
                "[PORTALS] Regions: {} x {} ({} total, {}x{} cells each)",
                state.pending.regions_wide,
                state.pending.regions_high,
                region_count,
                state.pending.super_tile_size,
                state.pending.super_tile_size
            );
            state.cursor = 0;
            state.step = GraphBuildStep::DetectingPortals;
        }
        GraphBuildStep::DetectingPortals => {
            // One row of regions per frame.
            let row_end = (state.cursor + state.pending.regions_wide).min(region_count);
            for region in state.cursor..row_end {
                detect_region_portals(&mut state.pending, &grid, region);
            }
            state.cursor = row_end;
            state.progress = 0.2 * state.cursor as f32 / region_count.max(1) as f32;

            if state.cursor >= region_count {
                info!("[PORTALS] Found {} portals", state.pending.portals.len());
                state.cursor = 0;
                state.step = GraphBuildStep::ConnectingRegions;
            }
        }
        GraphBuildStep::ConnectingRegions => {
            let batch_size = config.build_batch_size.max(1);
            let batch_start = std::time::Instant::now();
            let batch_end = (state.cursor + batch_size).min(region_count);
            for region in state.cursor..batch_end {
                let edges = connect_region(&state.pending, &grid, region);
                apply_connections(&mut state.pending, &edges);
            }
            debug!(
                "[PORTALS] Connected regions {}..{} of {} in {:?}",
                state.cursor,
                batch_end,
                region_count,
                batch_start.elapsed()
            );
            state.cursor = batch_end;
            state.progress = 0.2 + 0.8 * state.cursor as f32 / region_count.max(1) as f32;

            if state.cursor >= region_count {
                let graph = std::mem::take(&mut state.pending);
                let stats = graph.stats();
                info!(
                    "[PORTALS] {} portals, {} connections, {} regions without portals",
                    stats.portal_count, stats.connection_count, stats.isolated_regions
                );
                info!("=== PORTAL GRAPH BUILD COMPLETE ===");
                commands.insert_resource(graph);
                state.progress = 1.0;
                state.step = GraphBuildStep::Done;
            }
        }
        GraphBuildStep::Done => {}
    }
}
