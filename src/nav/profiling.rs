//! Performance profiling utilities
//!
//! Only active when the `perf_stats` feature is enabled.
//! Zero overhead when disabled.

// Re-export the profile macro
pub use dungeon_nav_macros::profile;
