use bevy::prelude::*;

use dungeon_nav::nav::config::{load_nav_config, NAV_CONFIG_PATH};
use dungeon_nav::nav::flow_field::{foot_cell, PlayerApproachMap, PlayerFleeMap};
use dungeon_nav::nav::map::{load_map, save_map, DungeonMap};
use dungeon_nav::nav::pathfinding::GraphBuildState;
use dungeon_nav::nav::{
    DungeonGrid, NavConfigPlugin, NavPath, NavResult, NavigationPlugin, PathRequest, PortalGraph, Position, Team,
};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use std::fs;
use std::path::PathBuf;

const DEMO_LAYOUT: &str = "
####################
#........#.........#
#........#.........#
#........#....##...#
#..####..#....##...#
#..#..............##
#..#.....#.........#
#........#....#....#
#........#....#....#
####.#######.#######
#........#.........#
#........#.........#
#...###..#...###...#
#........#.........#
#.................##
#........#.........#
#........#.........#
#........#.........#
#........#.........#
####################
";

/// Frames to wait for the portal graph before giving up.
const MAX_BUILD_FRAMES: usize = 10_000;

fn setup_file_logging() -> String {
    let log_dir = PathBuf::from("logs");
    if !log_dir.exists() {
        if let Err(e) = fs::create_dir_all(&log_dir) {
            eprintln!("Failed to create logs directory: {}", e);
        }
    }

    cleanup_old_logs(&log_dir, 25);

    let now = chrono::Local::now();
    let log_filename = format!("dungeon_nav_{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_path_str = log_dir.join(&log_filename).to_string_lossy().to_string();

    let file_appender = RollingFileAppender::new(Rotation::NEVER, &log_dir, &log_filename);
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false);
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dungeon_nav=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    log_path_str
}

fn cleanup_old_logs(log_dir: &PathBuf, keep_count: usize) {
    if let Ok(entries) = fs::read_dir(log_dir) {
        let mut log_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|s| s.starts_with("dungeon_nav") && s.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();

        // Oldest first
        log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

        if log_files.len() > keep_count {
            for file in log_files.iter().take(log_files.len() - keep_count) {
                let _ = fs::remove_file(file.path());
            }
        }
    }
}

#[derive(Default)]
struct DemoArgs {
    layout: Option<String>,
    load: Option<String>,
    save: Option<String>,
}

fn parse_args() -> DemoArgs {
    let mut args = DemoArgs::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--load" => args.load = iter.next(),
            "--save" => args.save = iter.next(),
            _ => args.layout = Some(arg),
        }
    }
    args
}

fn run(args: DemoArgs) -> NavResult<()> {
    let config = load_nav_config(NAV_CONFIG_PATH);

    let (grid, graph) = match &args.load {
        Some(path) => {
            let map = load_map(path)?;
            info!("Loaded map {} ({}x{}, {} portals)", path, map.grid.width, map.grid.height, map.graph.portals.len());
            (map.grid, Some(map.graph))
        }
        None => {
            let layout = match &args.layout {
                Some(path) => fs::read_to_string(path)?,
                None => DEMO_LAYOUT.to_string(),
            };
            (DungeonGrid::from_ascii(&layout, config.tile_size_fixed())?, None)
        }
    };

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(NavigationPlugin { config: NavConfigPlugin { path: None } })
        .insert_resource(config.clone())
        .insert_resource(grid.clone());
    if let Some(graph) = graph {
        app.insert_resource(graph);
    }

    let build_start = std::time::Instant::now();
    for _ in 0..MAX_BUILD_FRAMES {
        app.update();
        if app.world().resource::<GraphBuildState>().is_done() && app.world().contains_resource::<PortalGraph>() {
            break;
        }
    }
    let Some(graph) = app.world().get_resource::<PortalGraph>().cloned() else {
        error!("Portal graph was not built after {} frames", MAX_BUILD_FRAMES);
        return Ok(());
    };
    let stats = graph.stats();
    info!(
        "Portal graph ready in {:?}: {} regions, {} portals, {} connections",
        build_start.elapsed(),
        stats.region_count,
        stats.portal_count,
        stats.connection_count
    );

    // Fixed seed so the demo always picks the same spots.
    let mut rng = StdRng::seed_from_u64(7);
    let (Some(player_pos), Some(monster_pos)) = (grid.random_floor_position(&mut rng), grid.random_floor_position(&mut rng)) else {
        warn!("Dungeon has no floor, nothing to do");
        return Ok(());
    };

    app.world_mut().spawn((Position(player_pos), Team(config.player_team)));
    let monster = app.world_mut().spawn((Position(monster_pos), Team(config.player_team + 1))).id();

    app.world_mut().write_message(PathRequest { entity: monster, goal: player_pos });
    app.world_mut().run_schedule(FixedUpdate);

    match app.world().get::<NavPath>(monster) {
        Some(path) if path.is_reachable() => {
            info!("Monster path to player: {} waypoints", path.waypoints.len());
            let tile = grid.tile_size;
            for waypoint in &path.waypoints {
                info!("  ({:.2}, {:.2})", (waypoint.x / tile).to_num::<f32>(), (waypoint.y / tile).to_num::<f32>());
            }
        }
        Some(_) => info!("Player is unreachable from the monster"),
        None => warn!("Path request was not answered"),
    }

    let foot_offset = config.foot_offset_fixed();
    if let Some(cell) = foot_cell(&grid, monster_pos, foot_offset) {
        let approach = app.world().resource::<PlayerApproachMap>();
        let flee = app.world().resource::<PlayerFleeMap>();
        info!(
            "Monster at {:?}: approach {:?}, flee {:?}",
            cell,
            approach.0.value_at(cell),
            flee.0.value_at(cell)
        );
    }

    if let Some(path) = &args.save {
        save_map(path, &DungeonMap::new(grid, graph))?;
        info!("Saved map to {}", path);
    }

    Ok(())
}

fn main() {
    let log_file = setup_file_logging();
    println!("dungeon_nav demo - logging to {}", log_file);

    if let Err(e) = run(parse_args()) {
        error!("{}", e);
        std::process::exit(1);
    }
}
