use crate::nav::agent::TeamPositions;
use crate::nav::dungeon::{Cell, DungeonGrid};
use crate::nav::fixed_math::FixedVec2;
use super::field::{generate_flow_field, FlowField};

/// Cell an agent is standing on.
///
/// Positions are sprite corners, so the point under the agent's feet is
/// `foot_offset` tiles further along.
pub fn foot_cell(grid: &DungeonGrid, pos: FixedVec2, foot_offset: FixedVec2) -> Option<Cell> {
    grid.world_to_cell(pos + foot_offset * grid.tile_size)
}

/// Approach field seeded at several world positions at once.
pub fn multi_object_approach_map(grid: &DungeonGrid, positions: &[FixedVec2], foot_offset: FixedVec2) -> FlowField {
    let seeds: Vec<Cell> = positions
        .iter()
        .filter_map(|pos| foot_cell(grid, *pos, foot_offset))
        .collect();
    generate_flow_field(grid, &seeds)
}

/// Approach field toward every agent of `team`.
pub fn team_approach_map<P>(grid: &DungeonGrid, agents: &P, team: u32, foot_offset: FixedVec2) -> FlowField
where
    P: TeamPositions + ?Sized,
{
    multi_object_approach_map(grid, &agents.positions_of(team), foot_offset)
}

/// Flee field away from every agent of `team`.
pub fn team_flee_map<P>(grid: &DungeonGrid, agents: &P, team: u32, foot_offset: FixedVec2, flee_factor: f32) -> FlowField
where
    P: TeamPositions + ?Sized,
{
    team_approach_map(grid, agents, team, foot_offset).into_flee(grid, flee_factor)
}

/// Field pulling pack members toward their hives.
pub fn hive_pack_map(grid: &DungeonGrid, hive_positions: &[FixedVec2], foot_offset: FixedVec2) -> FlowField {
    multi_object_approach_map(grid, hive_positions, foot_offset)
}
