//! Rider equipment and the modifiers it applies
//!
//! Five fixed upgrade slots. Levels only ever go up within a run; a new run
//! starts from zero.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// Base coins paid for a delivery
pub const BASE_DELIVERY_REWARD: u32 = 3;
/// Coins lost when a package expires, before the helmet
pub const BASE_EXPIRY_PENALTY: u32 = 3;
/// Coins a coffee tile always pays
pub const COFFEE_COIN_BONUS: u32 = 2;
/// Distance refunded by a coffee tile
pub const COFFEE_DISTANCE_REFUND: u32 = 4;

/// Equipment slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EquipmentKey {
    /// Softens the coin loss when a package expires
    Helmet,
    /// Extra coins per delivery
    Bell,
    /// Slows perishable decay
    BikeFrame,
    /// Extra coins from coffee tiles
    CoffeeThermos,
    /// Extra seconds on new perishable packages
    Backpack,
}

impl EquipmentKey {
    pub const ALL: [EquipmentKey; 5] = [
        EquipmentKey::Helmet,
        EquipmentKey::Bell,
        EquipmentKey::BikeFrame,
        EquipmentKey::CoffeeThermos,
        EquipmentKey::Backpack,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EquipmentKey::Helmet => "Helmet",
            EquipmentKey::Bell => "Bell",
            EquipmentKey::BikeFrame => "Bike frame",
            EquipmentKey::CoffeeThermos => "Coffee thermos",
            EquipmentKey::Backpack => "Backpack",
        }
    }

    pub fn effect(self) -> &'static str {
        match self {
            EquipmentKey::Helmet => "Reduces coin loss when a package expires.",
            EquipmentKey::Bell => "Adds bonus coins on each delivery.",
            EquipmentKey::BikeFrame => "Slows down perishable timer decay.",
            EquipmentKey::CoffeeThermos => "Coffee tiles give extra coins.",
            EquipmentKey::Backpack => "New perishable packages start with extra seconds.",
        }
    }
}

/// Per-slot upgrade levels (0 = unequipped)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentLevels {
    pub helmet: u32,
    pub bell: u32,
    pub bike_frame: u32,
    pub coffee_thermos: u32,
    pub backpack: u32,
}

impl EquipmentLevels {
    pub fn get(&self, key: EquipmentKey) -> u32 {
        match key {
            EquipmentKey::Helmet => self.helmet,
            EquipmentKey::Bell => self.bell,
            EquipmentKey::BikeFrame => self.bike_frame,
            EquipmentKey::CoffeeThermos => self.coffee_thermos,
            EquipmentKey::Backpack => self.backpack,
        }
    }

    fn slot_mut(&mut self, key: EquipmentKey) -> &mut u32 {
        match key {
            EquipmentKey::Helmet => &mut self.helmet,
            EquipmentKey::Bell => &mut self.bell,
            EquipmentKey::BikeFrame => &mut self.bike_frame,
            EquipmentKey::CoffeeThermos => &mut self.coffee_thermos,
            EquipmentKey::Backpack => &mut self.backpack,
        }
    }

    /// Raise one slot by exactly one level, returning the new level
    pub fn upgrade(&mut self, key: EquipmentKey) -> u32 {
        let slot = self.slot_mut(key);
        *slot = slot.saturating_add(1);
        *slot
    }

    /// Multiplier applied to perishable decay: `max(0.5, 1 - 0.05 * bikeFrame)`
    pub fn decay_modifier(&self) -> f64 {
        (1.0 - f64::from(self.bike_frame) * 0.05).max(0.5)
    }

    /// Timer ticks consumed for `moved` steps. Zero steps never decay.
    pub fn effective_steps(&self, moved: u32) -> u32 {
        if moved == 0 {
            return 0;
        }
        let scaled = (f64::from(moved) * self.decay_modifier()).round() as u32;
        scaled.max(1)
    }

    /// Coins lost on expiry: `max(1, base - helmet)`
    pub fn expiry_penalty(&self) -> u32 {
        BASE_EXPIRY_PENALTY.saturating_sub(self.helmet).max(1)
    }

    /// Bell bonus: `floor((bell + 1) / 2)` once equipped
    pub fn bell_bonus(&self) -> u32 {
        if self.bell == 0 {
            0
        } else {
            self.bell.saturating_add(1) / 2
        }
    }

    /// Coins paid for one delivery
    pub fn delivery_reward(&self) -> u32 {
        BASE_DELIVERY_REWARD + self.bell_bonus()
    }

    /// Coins paid by a coffee tile, fixed bonus plus thermos
    pub fn coffee_reward(&self) -> u32 {
        COFFEE_COIN_BONUS + self.coffee_thermos
    }

    /// Extra seconds on a fresh perishable package
    pub fn backpack_bonus(&self) -> i32 {
        self.backpack.min(i32::MAX as u32) as i32
    }
}

/// One card in a level-up offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentChoice {
    pub key: EquipmentKey,
    pub next_level: u32,
}

/// Upgrades offered after a level-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeOffer {
    /// Level reached when the offer was made
    pub level: u32,
    pub choices: Vec<EquipmentChoice>,
}

impl UpgradeOffer {
    /// Draw 2-3 distinct slots uniformly, without weighting
    pub fn roll<R: Rng + ?Sized>(rng: &mut R, level: u32, current: &EquipmentLevels) -> Self {
        let amount = rng.random_range(2..=3);
        let choices = EquipmentKey::ALL
            .choose_multiple(rng, amount)
            .map(|&key| EquipmentChoice {
                key,
                next_level: current.get(key) + 1,
            })
            .collect();
        Self { level, choices }
    }

    pub fn offers(&self, key: EquipmentKey) -> bool {
        self.choices.iter().any(|c| c.key == key)
    }
}
