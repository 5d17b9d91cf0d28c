//! Entity placement on top of a generated grid
//!
//! Coin layout is seeded like the terrain. Goal, shop and house picks take
//! the session RNG so the caller decides how reproducible they are.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::grid::{Grid, Position};
use super::package::HouseMarker;
use super::progression;
use super::rng::{LayoutRng, coin_seed};
use super::tile::Tile;

/// Uniform road tile other than `exclude`; `exclude` itself when none exists
pub fn pick_goal_position<R: Rng + ?Sized>(
    grid: &Grid,
    exclude: Position,
    rng: &mut R,
) -> Position {
    let candidates: Vec<Position> = grid
        .positions()
        .filter(|&p| p != exclude && grid.tile(p) == Tile::Road)
        .collect();
    candidates.choose(rng).copied().unwrap_or(exclude)
}

/// Uniform building not already bound to a house marker
pub fn find_free_building_position<R: Rng + ?Sized>(
    grid: &Grid,
    used: &[HouseMarker],
    rng: &mut R,
) -> Option<Position> {
    let candidates: Vec<Position> = grid
        .positions_of(Tile::Building)
        .into_iter()
        .filter(|&p| !used.iter().any(|house| house.position == p))
        .collect();
    candidates.choose(rng).copied()
}

/// Uniform shop tile
pub fn pick_random_shop<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Option<Position> {
    grid.positions_of(Tile::Shop).choose(rng).copied()
}

/// Seeded coin layout: distinct road tiles, `4 + (level - 1)` of them
pub fn generate_coins(grid: &Grid, level: u32, seed: u64, regen: u32) -> Vec<Position> {
    let roads = grid.positions_of(Tile::Road);
    if roads.is_empty() {
        return Vec::new();
    }

    let mut rng = LayoutRng::new(coin_seed(seed, level, regen));
    let target = progression::coin_count(level).min(roads.len());
    let mut coins: Vec<Position> = Vec::with_capacity(target);
    while coins.len() < target {
        let candidate = roads[rng.index(roads.len())];
        if !coins.contains(&candidate) {
            coins.push(candidate);
        }
    }
    coins
}

/// Where the rider starts: the centre when it is on the road network,
/// otherwise the nearest road tile (toroidal distance, row-major ties),
/// otherwise the nearest walkable tile.
pub fn spawn_position(grid: &Grid) -> Position {
    let center = grid.center();
    if grid.tile(center).is_road_like() {
        return center;
    }

    let nearest = |accept: fn(Tile) -> bool| {
        grid.positions()
            .filter(|&p| accept(grid.tile(p)))
            .min_by_key(|&p| grid.torus_distance(center, p))
    };

    nearest(Tile::is_road_like)
        .or_else(|| nearest(Tile::is_walkable))
        .unwrap_or(center)
}
