use bevy::prelude::*;
use crate::nav::agent::Position;
use crate::nav::config::NavConfig;
use crate::nav::dungeon::DungeonGrid;
use crate::nav::fixed_math::FixedVec2;
use super::assembler::find_path;
use super::portal_graph::PortalGraph;

/// Ask for a path from the entity's current [`Position`] to `goal`.
#[derive(Message, Debug, Clone)]
pub struct PathRequest {
    pub entity: Entity,
    pub goal: FixedVec2,
}

/// Result of the last [`PathRequest`] for an entity.
///
/// Empty `waypoints` means the goal was unreachable.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct NavPath {
    pub goal: FixedVec2,
    pub waypoints: Vec<FixedVec2>,
}

impl NavPath {
    pub fn is_reachable(&self) -> bool {
        !self.waypoints.is_empty()
    }
}

pub(super) fn process_path_requests(
    mut path_requests: MessageReader<PathRequest>,
    mut commands: Commands,
    grid: Option<Res<DungeonGrid>>,
    graph: Option<Res<PortalGraph>>,
    positions: Query<&Position>,
    config: Res<NavConfig>,
) {
    if path_requests.is_empty() {
        return;
    }

    let request_count = path_requests.len();
    let (Some(grid), Some(graph)) = (grid, graph) else {
        warn!("[PATHFINDING] Portal graph not ready, dropping {} path requests", request_count);
        path_requests.clear();
        return;
    };

    let start_time = std::time::Instant::now();
    for request in path_requests.read() {
        let Ok(position) = positions.get(request.entity) else {
            warn!("[PATHFINDING] Path request for {:?} which has no Position", request.entity);
            continue;
        };

        let query_start = std::time::Instant::now();
        let waypoints = find_path(&graph, &grid, position.0, request.goal);
        let elapsed = query_start.elapsed();
        if elapsed.as_millis() > config.slow_query_warn_ms as u128 {
            warn!(
                "[PATHFINDING] Slow query: {:?} for {:?} -> {:?} ({} waypoints)",
                elapsed, position.0, request.goal, waypoints.len()
            );
        }
        if waypoints.is_empty() {
            debug!("[PATHFINDING] No path for {:?}: {:?} -> {:?}", request.entity, position.0, request.goal);
        }

        if let Ok(mut entity) = commands.get_entity(request.entity) {
            entity.insert(NavPath { goal: request.goal, waypoints });
        }
    }

    debug!("[PATHFINDING] Processed {} requests in {:?}", request_count, start_time.elapsed());
}
