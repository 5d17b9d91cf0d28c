//! Packages and house markers
//!
//! A package is created on a shop pickup together with the house marker that
//! receives it. Both disappear together on delivery or expiry.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::equipment::EquipmentLevels;
use super::grid::Position;
use super::progression;

/// Package / house colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
}

impl PackageColor {
    pub const ALL: [PackageColor; 5] = [
        PackageColor::Red,
        PackageColor::Blue,
        PackageColor::Green,
        PackageColor::Yellow,
        PackageColor::Purple,
    ];

    /// First colour not already in use, `Red` when every colour is taken
    pub fn first_free(in_use: &[PackageColor]) -> Self {
        Self::ALL
            .into_iter()
            .find(|color| !in_use.contains(color))
            .unwrap_or(PackageColor::Red)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageKind {
    Standard,
    Perishable,
}

/// Roll the kind of a freshly picked-up package
pub fn decide_package_kind<R: Rng + ?Sized>(rng: &mut R, level: u32) -> PackageKind {
    if rng.random_bool(progression::perishable_chance(level)) {
        PackageKind::Perishable
    } else {
        PackageKind::Standard
    }
}

/// Starting timer for a perishable package, backpack included
pub fn perishable_start_timer(level: u32, equipment: &EquipmentLevels) -> i32 {
    progression::initial_perishable_timer(level) + equipment.backpack_bonus()
}

/// A carried package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageItem {
    pub id: u32,
    pub color: PackageColor,
    pub kind: PackageKind,
    /// Remaining timer for perishables, `None` for standard packages
    pub remaining: Option<i32>,
}

impl PackageItem {
    pub fn new(
        id: u32,
        color: PackageColor,
        kind: PackageKind,
        level: u32,
        equipment: &EquipmentLevels,
    ) -> Self {
        let remaining = match kind {
            PackageKind::Perishable => Some(perishable_start_timer(level, equipment)),
            PackageKind::Standard => None,
        };
        Self {
            id,
            color,
            kind,
            remaining,
        }
    }

    /// Consume `effective` timer ticks, flooring at zero
    pub fn decay(&mut self, effective: u32) {
        if let Some(remaining) = self.remaining.as_mut() {
            let effective = i32::try_from(effective).unwrap_or(i32::MAX);
            *remaining = remaining.saturating_sub(effective).max(0);
        }
    }

    pub fn is_expired(&self) -> bool {
        self.remaining.is_some_and(|t| t <= 0)
    }
}

/// Binding from a building tile to the package it waits for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseMarker {
    pub position: Position,
    pub color: PackageColor,
    pub package_id: u32,
}
