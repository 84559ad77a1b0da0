mod assembler;
mod astar;
mod graph_build;
mod portal_astar;
mod portal_graph;
mod systems;
mod types;

#[cfg(test)]
mod tests;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use assembler::find_path;
pub use astar::{find_path_grid, find_path_local};
pub use graph_build::{
    apply_connections, build_portal_graph, connect_region, detect_portals, detect_region_portals,
    effective_super_tile_size, probe_cost, GraphBuildState, GraphBuildStep,
};
pub use portal_astar::find_portal_path;
pub use portal_graph::{PortalGraph, PortalGraphStats};
pub use systems::{NavPath, PathRequest};
pub use types::{Portal, PortalAxis, PortalConnection, PortalId, PortalPath, RegionId, SearchBounds};

use bevy::prelude::*;
use crate::nav::config::NavConfig;
use crate::nav::dungeon::DungeonGrid;

/// Portal graph maintenance and path request handling.
///
/// The graph is (re)built incrementally in `Update` whenever `DungeonGrid`
/// is inserted or changed; `PortalGraph` exists only while it is current.
/// Path requests are answered in `FixedUpdate`.
pub struct PathfindingPlugin;

impl Plugin for PathfindingPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<PathRequest>();
        app.init_resource::<NavConfig>();
        app.init_resource::<GraphBuildState>();
        app.add_systems(
            Update,
            (
                graph_build::start_portal_graph_build.run_if(resource_exists_and_changed::<DungeonGrid>),
                graph_build::incremental_build_portal_graph.run_if(resource_exists::<DungeonGrid>),
            )
                .chain(),
        );
        app.add_systems(FixedUpdate, systems::process_path_requests);
    }
}
