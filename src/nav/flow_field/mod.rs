mod field;
mod maps;


pub use field::{generate_flow_field, FlowField, UNREACHABLE};
pub use maps::{foot_cell, hive_pack_map, multi_object_approach_map, team_approach_map, team_flee_map};

use bevy::prelude::*;
use crate::nav::agent::{AgentPositions, Hive, Position};
use crate::nav::config::NavConfig;
use crate::nav::dungeon::DungeonGrid;
use crate::profile_log;

/// Approach field toward the player team.
#[derive(Resource, Default, Debug, Clone)]
pub struct PlayerApproachMap(pub FlowField);

/// Flee field away from the player team.
#[derive(Resource, Default, Debug, Clone)]
pub struct PlayerFleeMap(pub FlowField);

/// Approach field toward every [`Hive`].
#[derive(Resource, Default, Debug, Clone)]
pub struct HivePackMap(pub FlowField);

/// Number of times the shared fields have been regenerated.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct FlowFieldGeneration(pub u64);

/// Keeps the shared steering fields current, once per fixed tick.
pub struct FlowFieldPlugin;

impl Plugin for FlowFieldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NavConfig>()
            .init_resource::<PlayerApproachMap>()
            .init_resource::<PlayerFleeMap>()
            .init_resource::<HivePackMap>()
            .init_resource::<FlowFieldGeneration>()
            .add_systems(FixedUpdate, regenerate_flow_fields.run_if(resource_exists::<DungeonGrid>));
    }
}

pub(crate) fn regenerate_flow_fields(
    grid: Res<DungeonGrid>,
    config: Res<NavConfig>,
    agents: AgentPositions,
    hives: Query<&Position, With<Hive>>,
    mut approach: ResMut<PlayerApproachMap>,
    mut flee: ResMut<PlayerFleeMap>,
    mut hive_pack: ResMut<HivePackMap>,
    mut generation: ResMut<FlowFieldGeneration>,
) {
    let start = std::time::Instant::now();
    let foot_offset = config.foot_offset_fixed();

    approach.0 = team_approach_map(&*grid, &agents, config.player_team, foot_offset);
    flee.0 = approach.0.clone().into_flee(&grid, config.flee_factor);

    let hive_positions: Vec<_> = hives.iter().map(|pos| pos.0).collect();
    hive_pack.0 = hive_pack_map(&grid, &hive_positions, foot_offset);

    generation.0 += 1;
    let elapsed = start.elapsed();
    if elapsed.as_millis() > config.slow_query_warn_ms as u128 {
        warn!("[FLOW FIELD] Regenerating fields took {:?} ({}x{} grid)", elapsed, grid.width, grid.height);
    }
    profile_log!(
        generation.0,
        "[FLOW FIELD] Generation {}: {} hives, took {:?}",
        generation.0,
        hive_positions.len(),
        elapsed
    );
}
