//! Game state and core simulation types
//!
//! Everything a run needs lives in [`GameState`], including the session RNG,
//! so applying the same commands to the same state always gives the same
//! result.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::equipment::{EquipmentKey, EquipmentLevels, UpgradeOffer};
use super::grid::{Direction, Grid, Position};
use super::mapgen::generate_map_variant;
use super::package::{HouseMarker, PackageItem, PackageKind};
use super::placement::{generate_coins, pick_goal_position, spawn_position};
use super::tile::Tile;
use crate::consts::*;

/// Mixed into the run seed for the session RNG stream
const SESSION_STREAM_SALT: u64 = 0x5EED_C0FF_EE00_0001;

/// What counts as a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Ride to a goal marker on the road
    GoalMarker,
    /// Pick up at shops, drop at marked houses
    #[default]
    Packages,
}

/// Run setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOptions {
    pub width: i32,
    pub height: i32,
    /// Run seed; wall-clock time when absent
    pub seed: Option<u64>,
    pub mode: DeliveryMode,
    /// Length of the run clock
    pub run_seconds: u32,
    /// Packages the rider can carry at once
    pub inventory_capacity: usize,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed: None,
            mode: DeliveryMode::default(),
            run_seconds: DEFAULT_RUN_SECONDS,
            inventory_capacity: INVENTORY_CAPACITY,
        }
    }
}

impl GameOptions {
    /// Configured seed, or the current time in milliseconds
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        })
    }
}

/// Run phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Riding,
    /// Run clock hit zero; every command is absorbed
    TimeUp,
}

/// Something that happened during the last command, for audio/effects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Move rejected by a solid tile
    Bumped { at: Position },
    /// Soft obstacle pushed the rider sideways
    Deflected { from: Position, to: Position },
    CoinCollected { at: Position },
    CoffeeBonus { coins: u32 },
    PackagePicked {
        id: u32,
        kind: PackageKind,
        house: Position,
    },
    PackageDelivered { id: u32, reward: u32 },
    PackageExpired { id: u32, penalty: u32 },
    /// Delivery counter went up
    Delivered { total: u32 },
    LevelUp { level: u32 },
    UpgradeApplied { key: EquipmentKey, level: u32 },
    TimeUp,
}

/// Most urgent delivery, for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveTarget {
    pub position: Position,
    pub package_id: u32,
    pub remaining_time: Option<i32>,
}

/// Complete run state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Options with the seed resolved
    pub options: GameOptions,
    pub seed: u64,
    pub grid: Grid,
    pub rider_position: Position,
    /// Goal on the road (goal-marker mode only)
    pub goal_position: Option<Position>,
    pub facing: Direction,
    /// Cost-weighted steps this level
    pub distance: u32,
    /// Cost-weighted steps this run
    pub total_distance: u32,
    pub deliveries: u32,
    pub level: u32,
    /// Times the current level was regenerated; picks the layout variant
    #[serde(default)]
    pub regenerations: u32,
    /// Uncollected coins
    pub coins: Vec<Position>,
    pub coins_collected: u32,
    pub equipment: EquipmentLevels,
    /// Carried packages, oldest first
    pub packages: Vec<PackageItem>,
    pub houses: Vec<HouseMarker>,
    pub upgrade_offer: Option<UpgradeOffer>,
    pub run_time_remaining: u32,
    pub phase: RunPhase,
    /// Steps moved since the last tick (drives perishable decay)
    pub steps_since_tick: u32,
    /// Events raised by the last command
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Session randomness (deflection, slips, packages, offers)
    pub rng: Pcg32,
    next_package_id: u32,
}

impl GameState {
    /// Create a new run at level 1
    pub fn new(options: GameOptions) -> Self {
        let seed = options.resolve_seed();
        let options = GameOptions {
            seed: Some(seed),
            width: options.width.max(MIN_GRID_SIDE),
            height: options.height.max(MIN_GRID_SIDE),
            inventory_capacity: options.inventory_capacity.max(1),
            ..options
        };

        let mut state = Self {
            grid: Grid::filled(options.width, options.height, Tile::Grass),
            rider_position: Position::ZERO,
            goal_position: None,
            facing: Direction::Down,
            distance: 0,
            total_distance: 0,
            deliveries: 0,
            level: 1,
            regenerations: 0,
            coins: Vec::new(),
            coins_collected: 0,
            equipment: EquipmentLevels::default(),
            packages: Vec::new(),
            houses: Vec::new(),
            upgrade_offer: None,
            run_time_remaining: options.run_seconds,
            phase: RunPhase::Riding,
            steps_since_tick: 0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed ^ SESSION_STREAM_SALT),
            next_package_id: 1,
            seed,
            options,
        };
        state.enter_level(1);

        log::info!(
            "New run: {}x{} seed {} ({:?} mode)",
            state.options.width,
            state.options.height,
            seed,
            state.options.mode
        );
        state
    }

    /// Replace the level wholesale: fresh grid, rider at spawn, new goal and
    /// coins, level distance cleared, packages and houses dropped. The layout
    /// variant is `regenerations`.
    pub fn enter_level(&mut self, level: u32) {
        self.level = level;
        self.grid = generate_map_variant(&self.options, level, self.regenerations);
        self.rider_position = spawn_position(&self.grid);
        self.goal_position = match self.options.mode {
            DeliveryMode::GoalMarker => Some(pick_goal_position(
                &self.grid,
                self.rider_position,
                &mut self.rng,
            )),
            DeliveryMode::Packages => None,
        };
        self.coins = generate_coins(&self.grid, level, self.seed, self.regenerations);
        self.distance = 0;
        self.steps_since_tick = 0;
        self.packages.clear();
        self.houses.clear();
    }

    /// Allocate a package id
    pub fn next_package_id(&mut self) -> u32 {
        let id = self.next_package_id;
        self.next_package_id += 1;
        id
    }

    /// House marker bound to a position
    pub fn house_at(&self, pos: Position) -> Option<&HouseMarker> {
        self.houses.iter().find(|h| h.position == pos)
    }

    /// Walkability including open (marked) houses
    pub fn is_walkable_at(&self, pos: Position) -> bool {
        let tile = self.grid.tile(pos);
        tile.is_walkable() || (tile == Tile::Building && self.house_at(pos).is_some())
    }

    /// Tile under the rider
    pub fn current_tile(&self) -> Tile {
        self.grid.tile(self.rider_position)
    }

    /// Human-readable malus for the rider's tile
    pub fn status_label(&self) -> &'static str {
        self.current_tile().status_label()
    }

    /// The delivery to chase next: the perishable closest to expiring, else
    /// the oldest package, else the goal marker.
    pub fn active_target(&self) -> Option<ActiveTarget> {
        let urgent = self
            .packages
            .iter()
            .min_by_key(|p| p.remaining.unwrap_or(i32::MAX));

        if let Some(pkg) = urgent {
            return self
                .houses
                .iter()
                .find(|h| h.package_id == pkg.id)
                .map(|house| ActiveTarget {
                    position: house.position,
                    package_id: pkg.id,
                    remaining_time: pkg.remaining,
                });
        }

        self.goal_position.map(|position| ActiveTarget {
            position,
            package_id: 0,
            remaining_time: None,
        })
    }

    /// Events raised by the last command
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }
}

/// Start a run
pub fn create_game(options: GameOptions) -> GameState {
    GameState::new(options)
}
