//! Tile kinds and their movement properties
//!
//! Properties are queried through methods so tile semantics stay in one place.

use serde::{Deserialize, Serialize};

/// One grid cell's terrain/feature classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tile {
    Road,
    #[default]
    Grass,
    Tree,
    /// Solid unless a house marker references it
    Building,
    Shop,
    /// Steps landing here cost double
    Slow,
    Coffee,
    Pothole,
    Rock,
    Bench,
    Leaf,
    Void,
}

/// Chance that a soft obstacle pushes the rider sideways
pub const DEFLECTION_CHANCE: f64 = 0.4;
/// Chance that leaves cost an extra step
pub const LEAF_SLIP_CHANCE: f64 = 0.3;

impl Tile {
    /// Walkable without any delivery context. Buildings answer `false` here;
    /// the reducer opens them when a house marker points at them.
    pub fn is_walkable(self) -> bool {
        matches!(
            self,
            Tile::Road
                | Tile::Grass
                | Tile::Slow
                | Tile::Coffee
                | Tile::Shop
                | Tile::Pothole
                | Tile::Rock
                | Tile::Bench
                | Tile::Leaf
        )
    }

    /// Pothole, rock or bench: walkable, but may deflect the rider
    pub fn is_soft_obstacle(self) -> bool {
        matches!(self, Tile::Pothole | Tile::Rock | Tile::Bench)
    }

    /// Road surface, including anything placed on top of it
    pub fn is_road_like(self) -> bool {
        matches!(
            self,
            Tile::Road | Tile::Pothole | Tile::Rock | Tile::Bench | Tile::Leaf
        )
    }

    /// Fixed extra cost for entering this tile as a move target.
    /// Leaves are chance-based and handled by the reducer.
    pub fn obstacle_cost(self) -> u32 {
        match self {
            Tile::Pothole => 2,
            Tile::Rock | Tile::Bench => 1,
            _ => 0,
        }
    }

    /// Extra cost for landing on this tile
    pub fn landing_cost(self) -> u32 {
        match self {
            Tile::Slow => 1,
            _ => 0,
        }
    }

    /// Short status line shown while standing on this tile
    pub fn status_label(self) -> &'static str {
        match self {
            Tile::Pothole => "Pothole ahead: small time penalty.",
            Tile::Rock => "Rock on the road: slight slowdown.",
            Tile::Bench => "Bench in the way: small slowdown.",
            Tile::Leaf => "Slippery leaves: small time loss (chance).",
            Tile::Tree => "Tree collision: heavy time and coin penalty.",
            Tile::Coffee => "Coffee tile: bonus coins and time.",
            Tile::Slow => "Slow ground: steps cost more distance.",
            _ => "No active maluses. Ride safe.",
        }
    }

    /// Popup label for tiles that carry a malus or bonus
    pub fn malus_popup(self) -> Option<&'static str> {
        match self {
            Tile::Pothole => Some("Pothole · small time penalty"),
            Tile::Rock => Some("Rock · slight slowdown"),
            Tile::Bench => Some("Bench · small slowdown"),
            Tile::Leaf => Some("Leaves · small time loss (chance)"),
            Tile::Tree => Some("Tree · heavy time & coin loss"),
            Tile::Coffee => Some("Coffee · bonus coins & time"),
            Tile::Slow => Some("Slow ground · slower steps"),
            _ => None,
        }
    }
}
