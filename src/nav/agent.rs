use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use super::fixed_math::FixedVec2;

/// World-space position of a navigating agent.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position(pub FixedVec2);

/// Faction an agent belongs to. Flow fields are seeded per team.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Team(pub u32);

/// Marks the agents that seed the hive pack field.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Hive;

/// Read access to "where are the agents of team N".
///
/// Flow-field seeding only depends on this trait, so the generators can be
/// driven from an ECS query, a snapshot, or a plain slice in tests.
pub trait TeamPositions {
    fn positions_of(&self, team: u32) -> Vec<FixedVec2>;
}

impl TeamPositions for [(FixedVec2, Team)] {
    fn positions_of(&self, team: u32) -> Vec<FixedVec2> {
        self.iter()
            .filter(|(_, t)| t.0 == team)
            .map(|(pos, _)| *pos)
            .collect()
    }
}

impl TeamPositions for Vec<(FixedVec2, Team)> {
    fn positions_of(&self, team: u32) -> Vec<FixedVec2> {
        self.as_slice().positions_of(team)
    }
}

/// ECS-backed [`TeamPositions`].
#[derive(SystemParam)]
pub struct AgentPositions<'w, 's> {
    agents: Query<'w, 's, (&'static Position, &'static Team)>,
}

impl TeamPositions for AgentPositions<'_, '_> {
    fn positions_of(&self, team: u32) -> Vec<FixedVec2> {
        self.agents
            .iter()
            .filter(|(_, t)| t.0 == team)
            .map(|(pos, _)| pos.0)
            .collect()
    }
}
