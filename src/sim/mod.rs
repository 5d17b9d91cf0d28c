//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded layout RNG per level, session RNG stored in the state
//! - Commands are the only input
//! - No I/O or platform dependencies

pub mod autopilot;
pub mod equipment;
pub mod grid;
pub mod mapgen;
pub mod package;
pub mod placement;
pub mod progression;
pub mod reducer;
pub mod rng;
pub mod state;
pub mod tile;

pub use equipment::{EquipmentChoice, EquipmentKey, EquipmentLevels, UpgradeOffer};
pub use grid::{Direction, Grid, Position};
pub use mapgen::{generate_map, generate_map_variant};
pub use package::{HouseMarker, PackageColor, PackageItem, PackageKind};
pub use reducer::{Command, apply_command};
pub use state::{
    ActiveTarget, DeliveryMode, GameEvent, GameOptions, GameState, RunPhase, create_game,
};
pub use tile::Tile;
