use serde::{Serialize, Deserialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use flate2::write::ZlibEncoder;
use flate2::read::ZlibDecoder;
use flate2::Compression;
use super::dungeon::DungeonGrid;
use super::error::{NavError, NavResult};
use super::pathfinding::{build_portal_graph, PortalGraph};

pub const MAP_VERSION: u32 = 1;

/// A dungeon layout together with its prebuilt portal graph.
///
/// Saving the graph with the layout lets a host skip the load-time build.
/// Paths and flow fields are never stored.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DungeonMap {
    pub version: u32,
    pub grid: DungeonGrid,
    pub graph: PortalGraph,
}

impl DungeonMap {
    pub fn new(grid: DungeonGrid, graph: PortalGraph) -> Self {
        Self { version: MAP_VERSION, grid, graph }
    }

    /// Build the portal graph for `grid` and bundle both.
    pub fn build(grid: DungeonGrid, super_tile_size: usize) -> Self {
        let graph = build_portal_graph(&grid, super_tile_size);
        Self::new(grid, graph)
    }
}

pub fn write_map<W: Write>(writer: W, map: &DungeonMap) -> NavResult<()> {
    let mut encoder = ZlibEncoder::new(writer, Compression::default());
    bincode::serialize_into(&mut encoder, map)?;
    encoder.finish()?;
    Ok(())
}

pub fn read_map<R: Read>(reader: R) -> NavResult<DungeonMap> {
    let mut decoder = ZlibDecoder::new(reader);
    let map: DungeonMap = bincode::deserialize_from(&mut decoder)?;
    if map.version != MAP_VERSION {
        return Err(NavError::MapVersion { expected: MAP_VERSION, found: map.version });
    }
    Ok(map)
}

pub fn save_map(path: impl AsRef<Path>, map: &DungeonMap) -> NavResult<()> {
    let file = File::create(path)?;
    write_map(BufWriter::new(file), map)
}

pub fn load_map(path: impl AsRef<Path>) -> NavResult<DungeonMap> {
    let file = File::open(path)?;
    read_map(BufReader::new(file))
}
