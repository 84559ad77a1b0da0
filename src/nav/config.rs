use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use super::dungeon::DEFAULT_TILE_SIZE;
use super::error::NavResult;
use super::fixed_math::{FixedNum, FixedVec2};

/// Where the startup system looks for the navigation config.
pub const NAV_CONFIG_PATH: &str = "assets/nav_config.ron";

/// Static navigation configuration, loaded once at startup.
///
/// These values shape the portal graph and the flow fields. Changing
/// `super_tile_size` after the graph is built has no effect until the
/// dungeon grid changes and the graph is rebuilt.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct NavConfig {
    /// Edge length of a region (super-tile) in cells.
    pub super_tile_size: usize,
    /// World units per tile, used for grids the host builds from text layouts.
    pub tile_size: f32,
    /// Repulsion factor applied when a flee field is derived from an approach field.
    pub flee_factor: f32,
    /// Offset (in tiles) from an agent's position to the point standing on the floor.
    pub foot_offset: (f32, f32),
    /// Team whose agents seed the player approach / flee fields.
    pub player_team: u32,
    /// Regions connected per frame while the portal graph is being built.
    pub build_batch_size: usize,
    /// Path queries slower than this are logged as warnings.
    pub slow_query_warn_ms: u64,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            super_tile_size: 10,
            tile_size: DEFAULT_TILE_SIZE,
            flee_factor: 1.2,
            foot_offset: (0.45, 0.85),
            player_team: 0,
            build_batch_size: 5,
            slow_query_warn_ms: 4,
        }
    }
}

impl NavConfig {
    pub fn from_ron(contents: &str) -> NavResult<Self> {
        Ok(ron::from_str::<NavConfig>(contents)?.validated())
    }

    /// Replace values the navigation code cannot use with their defaults.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if fixed_tile_size(self.tile_size).is_none() {
            warn!("[CONFIG] tile_size {} is invalid, using {}", self.tile_size, defaults.tile_size);
            self.tile_size = defaults.tile_size;
        }
        if fixed_offset(self.foot_offset).is_none() {
            warn!("[CONFIG] foot_offset {:?} is invalid, using {:?}", self.foot_offset, defaults.foot_offset);
            self.foot_offset = defaults.foot_offset;
        }
        if !self.flee_factor.is_finite() {
            warn!("[CONFIG] flee_factor {} is invalid, using {}", self.flee_factor, defaults.flee_factor);
            self.flee_factor = defaults.flee_factor;
        }
        self
    }

    /// Tile size in fixed point; the default when the configured value is unusable.
    pub fn tile_size_fixed(&self) -> FixedNum {
        fixed_tile_size(self.tile_size).unwrap_or_else(|| FixedNum::from_num(DEFAULT_TILE_SIZE))
    }

    pub fn foot_offset_fixed(&self) -> FixedVec2 {
        fixed_offset(self.foot_offset).unwrap_or_else(|| FixedVec2::from_f32(0.45, 0.85))
    }
}

/// Finite, positive and representable.
fn fixed_tile_size(tile_size: f32) -> Option<FixedNum> {
    FixedNum::checked_from_num(tile_size).filter(|size| *size > FixedNum::ZERO)
}

fn fixed_offset((x, y): (f32, f32)) -> Option<FixedVec2> {
    Some(FixedVec2::new(FixedNum::checked_from_num(x)?, FixedNum::checked_from_num(y)?))
}

/// Read the config at `path`, falling back to defaults (with an error log)
/// when the file is missing or malformed.
pub fn load_nav_config(path: &str) -> NavConfig {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            error!("[CONFIG] Failed to read {}: {}", path, e);
            error!("[CONFIG] Using default NavConfig");
            return NavConfig::default();
        }
    };

    match NavConfig::from_ron(&contents) {
        Ok(config) => {
            info!("[CONFIG] Loaded navigation config from {}", path);
            config
        }
        Err(e) => {
            error!("[CONFIG] Failed to parse {}: {}", path, e);
            error!("[CONFIG] Using default NavConfig");
            NavConfig::default()
        }
    }
}

/// Inserts [`NavConfig`] and, when `path` is set, replaces it at startup with
/// the contents of that file. With `path: None` the host's own `NavConfig`
/// resource (or the defaults) is used as is.
pub struct NavConfigPlugin {
    pub path: Option<String>,
}

impl Default for NavConfigPlugin {
    fn default() -> Self {
        Self { path: Some(NAV_CONFIG_PATH.to_string()) }
    }
}

#[derive(Resource)]
struct NavConfigPath(String);

impl Plugin for NavConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NavConfig>();
        if let Some(path) = &self.path {
            app.insert_resource(NavConfigPath(path.clone()))
                .add_systems(Startup, load_startup_config);
        }
    }
}

fn load_startup_config(mut commands: Commands, path: Res<NavConfigPath>) {
    commands.insert_resource(load_nav_config(&path.0));
}
