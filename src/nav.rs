pub mod agent;
pub mod config;
pub mod dungeon;
pub mod error;
pub mod fixed_math;
pub mod flow_field;
pub mod map;
pub mod pathfinding;
pub mod profiling;

use bevy::prelude::*;

pub use agent::{AgentPositions, Hive, Position, Team, TeamPositions};
pub use config::{NavConfig, NavConfigPlugin};
pub use dungeon::{Cell, DungeonGrid, TileKind};
pub use error::{GridError, NavError, NavResult};
pub use fixed_math::{FixedNum, FixedVec2};
pub use flow_field::{FlowField, FlowFieldPlugin, HivePackMap, PlayerApproachMap, PlayerFleeMap};
pub use pathfinding::{find_path, NavPath, PathRequest, PathfindingPlugin, PortalGraph};

/// Everything needed to navigate a dungeon: config, portal graph upkeep,
/// path requests and the shared flow fields.
///
/// Insert a [`DungeonGrid`] resource to start; the portal graph is built
/// over the following frames.
#[derive(Default)]
pub struct NavigationPlugin {
    pub config: NavConfigPlugin,
}

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            NavConfigPlugin { path: self.config.path.clone() },
            PathfindingPlugin,
            FlowFieldPlugin,
        ));
    }
}
