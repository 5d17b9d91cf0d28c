//! Per-level difficulty scaling
//!
//! Every formula that depends on the level lives here so balance changes
//! touch one file.

/// Deliveries needed for each level-up
pub const DELIVERIES_PER_LEVEL: u32 = 5;

/// True when this delivery count triggers a level-up
pub fn is_level_up(deliveries: u32) -> bool {
    deliveries > 0 && deliveries.is_multiple_of(DELIVERIES_PER_LEVEL)
}

#[inline]
fn levels_above_first(level: u32) -> f64 {
    f64::from(level.saturating_sub(1))
}

/// Vertical roads: `clamp(max(2, width/8) + min(2, (level-1)/3), 2, 4)`
pub fn vertical_road_count(width: i32, level: u32) -> usize {
    let base = (width / 8).max(2) as usize;
    let extra = (level.saturating_sub(1) / 3).min(2) as usize;
    (base + extra).clamp(2, 4)
}

/// Vertical roads start decaying (random gaps) from this level
pub const ROAD_DECAY_LEVEL: u32 = 4;
/// Chance of a gap in a decaying vertical road
pub const ROAD_GAP_CHANCE: f64 = 0.08;

/// Buildings placed next to roads
pub fn required_buildings(level: u32) -> usize {
    let base = if level <= 5 { 3 } else { 5 };
    base.max(1)
}

/// Shop count range `(min, max)` before clamping to candidates
pub fn shop_range(level: u32) -> (usize, usize) {
    if level <= 5 { (2, 3) } else { (5, 7) }
}

/// Shops actually placed given the number of road-adjacent candidates
pub fn shop_target(level: u32, candidates: usize) -> usize {
    let (min, max) = shop_range(level);
    max.max(min).min(candidates)
}

pub fn tree_chance(level: u32) -> f64 {
    (0.14 + levels_above_first(level) * 0.03).min(0.30)
}

pub fn slow_chance(level: u32) -> f64 {
    (0.06 + levels_above_first(level) * 0.02).min(0.18)
}

pub fn coffee_chance(level: u32) -> f64 {
    (0.02 + levels_above_first(level) * 0.005).min(0.05)
}

pub fn soft_obstacle_chance(level: u32) -> f64 {
    (0.04 + levels_above_first(level) * 0.01).min(0.15)
}

pub fn leaf_chance(level: u32) -> f64 {
    (0.06 + levels_above_first(level) * 0.005).min(0.20)
}

/// Coins scattered on the road each level
pub fn coin_count(level: u32) -> usize {
    4 + level.saturating_sub(1) as usize
}

/// Probability that a new package is perishable
pub fn perishable_chance(level: u32) -> f64 {
    (0.25 + levels_above_first(level) * 0.05).min(0.70)
}

/// Starting timer of a perishable package, before equipment
pub fn initial_perishable_timer(level: u32) -> i32 {
    let drop = level.saturating_sub(1).min(8) as i32;
    (22 - drop).max(10)
}
