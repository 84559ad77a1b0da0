pub mod nav;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Log a message every 100th invocation of a recurring system when the
/// `perf_stats` feature is enabled.
///
/// `$counter` is any `u64`-like expression that increases once per call (for
/// example the flow-field generation counter). When `perf_stats` is disabled
/// this expands to an empty block and the arguments are never evaluated.
///
/// # Example
/// ```ignore
/// profile_log!(generation.0, "Regenerated {} flow fields", 3);
/// ```
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($counter:expr, $($arg:tt)*) => {
        if $counter % 100 == 0 {
            bevy::prelude::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($counter:expr, $($arg:tt)*) => {};
}
