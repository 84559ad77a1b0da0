use thiserror::Error;

/// Problems turning a text layout into a [`DungeonGrid`](super::dungeon::DungeonGrid).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("dungeon layout is empty")]
    Empty,

    #[error("row {row} has {found} tiles, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },

    #[error("unknown tile glyph {glyph:?} at ({x}, {y})")]
    UnknownTile { glyph: char, x: usize, y: usize },
}

/// Errors from the fallible (I/O and parsing) edges of the crate.
///
/// Failed searches are never errors: they are empty paths or infinite costs.
#[derive(Error, Debug)]
pub enum NavError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("map encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("config parse error: {0}")]
    Config(#[from] ron::error::SpannedError),

    #[error("invalid dungeon layout: {0}")]
    Grid(#[from] GridError),

    #[error("map file version {found} is not supported (expected {expected})")]
    MapVersion { expected: u32, found: u32 },
}

pub type NavResult<T> = std::result::Result<T, NavError>;
