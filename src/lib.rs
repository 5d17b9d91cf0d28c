//! Chill Rider - a cosy top-down bike delivery game on a wrapping grid
//!
//! Core modules:
//! - `sim`: Deterministic simulation (map generation, reducer, game state)
//! - `settings`: JSON-backed run configuration
//! - `summary`: Run summaries and the leaderboard

pub mod settings;
pub mod sim;
pub mod summary;

pub use settings::{Settings, SettingsError};
pub use summary::{Leaderboard, RunSummary};

/// Game configuration constants
pub mod consts {
    /// Default grid size in tiles
    pub const DEFAULT_WIDTH: i32 = 16;
    pub const DEFAULT_HEIGHT: i32 = 10;
    /// Smallest grid side accepted; below this the generator has no room
    pub const MIN_GRID_SIDE: i32 = 4;

    /// Run clock length in seconds
    pub const DEFAULT_RUN_SECONDS: u32 = 180;
    /// Packages carried at once
    pub const INVENTORY_CAPACITY: usize = 3;
}
