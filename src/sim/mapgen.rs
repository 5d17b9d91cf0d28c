//! Procedural map generation
//!
//! Builds a fresh grid for a level. Stages run in a fixed order and each
//! stage only overwrites `Grass` unless noted, so the same
//! `(width, height, seed, level, regen)` always yields the same grid.
//!
//! Every road tile ends up in one walkable component: the spine crosses
//! every column, vertical roads cross the spine, and gaps left in vertical
//! roads are kept clear of trees and buildings.

use glam::IVec2;

use super::grid::{Direction, Grid, Position};
use super::progression;
use super::rng::{LayoutRng, terrain_seed};
use super::state::GameOptions;
use super::tile::Tile;

/// Per-column chance the main road climbs one row
const ROAD_CLIMB_CHANCE: f64 = 0.12;
/// Per-column chance the main road sinks one row (rolled when it did not climb)
const ROAD_SINK_CHANCE: f64 = 0.24;
/// Per-column chance of a one-tile branch off the main road
const ROAD_BRANCH_CHANCE: f64 = 0.1;
/// Chance a vertical road widens by one tile at a row
const ROAD_WIDEN_CHANCE: f64 = 0.08;
/// Chance a tree spreads to its right / lower neighbour
const TREE_SPREAD_CHANCE: f64 = 0.4;

/// Generate the grid for `level`
pub fn generate_map(options: &GameOptions, level: u32) -> Grid {
    generate_map_variant(options, level, 0)
}

/// Generate the `regen`-th layout of `level`
pub fn generate_map_variant(options: &GameOptions, level: u32, regen: u32) -> Grid {
    let level = level.max(1);
    let mut rng = LayoutRng::new(terrain_seed(options.resolve_seed(), level, regen));
    let mut grid = Grid::filled(options.width, options.height, Tile::Grass);

    carve_main_road(&mut grid, &mut rng);
    let gaps = carve_vertical_roads(&mut grid, &mut rng, level);
    place_buildings(&mut grid, &mut rng, level, &gaps);
    scatter_trees(&mut grid, &mut rng, level, &gaps);
    scatter_on_grass(&mut grid, &mut rng, progression::slow_chance(level), Tile::Slow);
    place_shops(&mut grid, &mut rng, level);
    scatter_on_grass(&mut grid, &mut rng, progression::coffee_chance(level), Tile::Coffee);
    scatter_road_obstacles(&mut grid, &mut rng, level);

    log::info!(
        "Level {} (variant {}) map {}x{}: {} road, {} buildings, {} shops",
        level,
        regen,
        grid.width(),
        grid.height(),
        grid.positions().filter(|&p| grid.tile(p).is_road_like()).count(),
        grid.count(Tile::Building),
        grid.count(Tile::Shop),
    );

    grid
}

/// Horizontal spine with vertical drift. When the road shifts rows it also
/// paints the new row in the current column, so the spine stays 4-connected.
fn carve_main_road(grid: &mut Grid, rng: &mut LayoutRng) {
    let height = grid.height();
    let mut y = height / 2;

    for x in 0..grid.width() {
        grid.set(IVec2::new(x, y), Tile::Road);

        let before = y;
        if rng.chance(ROAD_CLIMB_CHANCE) && y > 1 {
            y -= 1;
        } else if rng.chance(ROAD_SINK_CHANCE) && y < height - 2 {
            y += 1;
        }
        if y != before {
            grid.set(IVec2::new(x, y), Tile::Road);
        }

        if rng.chance(ROAD_BRANCH_CHANCE) {
            let dy = if rng.chance(0.5) { -1 } else { 1 };
            // Out-of-range rows are dropped by `set`
            grid.set(IVec2::new(x, y + dy), Tile::Road);
        }
    }
}

/// Vertical roads; returns the gap tiles left as grass
fn carve_vertical_roads(grid: &mut Grid, rng: &mut LayoutRng, level: u32) -> Vec<Position> {
    let width = grid.width();
    let count = progression::vertical_road_count(width, level);
    let decays = level >= progression::ROAD_DECAY_LEVEL;
    let mut gaps = Vec::new();

    for i in 0..count {
        let x = ((i as i32 + 1) * width) / (count as i32 + 1);
        for y in 0..grid.height() {
            let pos = IVec2::new(x, y);
            if decays && rng.chance(progression::ROAD_GAP_CHANCE) {
                if grid.tile(pos) == Tile::Grass {
                    gaps.push(pos);
                }
                continue;
            }
            grid.set(pos, Tile::Road);

            let side = IVec2::new(x + 1, y);
            if rng.chance(ROAD_WIDEN_CHANCE) && grid.get(side) == Some(Tile::Grass) {
                grid.set(side, Tile::Road);
            }
        }
    }
    // A later column or widening may have paved over a gap
    gaps.retain(|&p| grid.tile(p) == Tile::Grass);
    gaps
}

/// Grass tiles with a road 4-neighbour, row-major
fn road_adjacent_grass(grid: &Grid) -> Vec<Position> {
    grid.positions()
        .filter(|&p| grid.tile(p) == Tile::Grass && grid.touches_road(p))
        .collect()
}

/// Draw up to `target` candidates without replacement and paint them
fn place_from_candidates(
    grid: &mut Grid,
    rng: &mut LayoutRng,
    mut candidates: Vec<Position>,
    target: usize,
    tile: Tile,
) -> usize {
    let mut placed = 0;
    while placed < target && !candidates.is_empty() {
        let pos = candidates.remove(rng.index(candidates.len()));
        grid.set(pos, tile);
        placed += 1;
    }
    placed
}

fn place_buildings(grid: &mut Grid, rng: &mut LayoutRng, level: u32, reserved: &[Position]) {
    let mut candidates = road_adjacent_grass(grid);
    candidates.retain(|p| !reserved.contains(p));
    let target = progression::required_buildings(level).min(candidates.len());
    let placed = place_from_candidates(grid, rng, candidates, target, Tile::Building);

    if placed == 0 {
        // Prefer grass next to a tile that stays walkable, so the door is reachable
        let open = |p: Position| {
            Direction::ALL.iter().any(|d| {
                let n = grid.step(p, *d);
                grid.tile(n).is_road_like() || reserved.contains(&n)
            })
        };
        let grass = |p: &Position| grid.tile(*p) == Tile::Grass && !reserved.contains(p);
        let fallback = grid
            .positions()
            .filter(grass)
            .find(|&p| open(p))
            .or_else(|| grid.positions().find(grass));
        match fallback {
            Some(pos) => {
                log::warn!(
                    "No road-adjacent grass at level {}; forcing building at {}",
                    level,
                    pos
                );
                grid.set(pos, Tile::Building);
            }
            None => log::warn!("Level {} map has no grass left for a building", level),
        }
    }
}

fn scatter_trees(grid: &mut Grid, rng: &mut LayoutRng, level: u32, reserved: &[Position]) {
    let chance = progression::tree_chance(level);
    let positions: Vec<Position> = grid.positions().collect();
    let plantable = |grid: &Grid, p: Position| {
        grid.get(p) == Some(Tile::Grass) && !reserved.contains(&p)
    };

    for pos in positions {
        if !plantable(grid, pos) || !rng.chance(chance) {
            continue;
        }
        grid.set(pos, Tile::Tree);

        for neighbour in [pos + IVec2::X, pos + IVec2::Y] {
            if rng.chance(TREE_SPREAD_CHANCE) && plantable(grid, neighbour) {
                grid.set(neighbour, Tile::Tree);
            }
        }
    }
}

fn scatter_on_grass(grid: &mut Grid, rng: &mut LayoutRng, chance: f64, tile: Tile) {
    let positions: Vec<Position> = grid.positions().collect();
    for pos in positions {
        if grid.tile(pos) == Tile::Grass && rng.chance(chance) {
            grid.set(pos, tile);
        }
    }
}

fn place_shops(grid: &mut Grid, rng: &mut LayoutRng, level: u32) {
    let candidates = road_adjacent_grass(grid);
    if candidates.is_empty() {
        return;
    }
    let target = progression::shop_target(level, candidates.len());
    place_from_candidates(grid, rng, candidates, target, Tile::Shop);
}

/// Soft obstacles and leaves only ever replace plain road
fn scatter_road_obstacles(grid: &mut Grid, rng: &mut LayoutRng, level: u32) {
    let soft = progression::soft_obstacle_chance(level);
    let leaf = progression::leaf_chance(level);
    let positions: Vec<Position> = grid.positions().collect();

    for pos in positions {
        if grid.tile(pos) != Tile::Road {
            continue;
        }
        let roll = rng.next_f64();
        if roll < soft {
            let pick = rng.next_f64();
            let obstacle = if pick < 1.0 / 3.0 {
                Tile::Pothole
            } else if pick < 2.0 / 3.0 {
                Tile::Rock
            } else {
                Tile::Bench
            };
            grid.set(pos, obstacle);
        } else if roll < soft + leaf {
            grid.set(pos, Tile::Leaf);
        }
    }
}
