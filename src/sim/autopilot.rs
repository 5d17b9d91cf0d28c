//! Simple rider AI for demos and soak tests
//!
//! Breadth-first search over walkable tiles on the torus. Path cost is the
//! step count, not the weighted distance.

use std::collections::VecDeque;

use super::grid::{Direction, Grid, Position};
use super::state::{DeliveryMode, GameState, RunPhase};
use super::tile::Tile;

/// Tiles the rider should head for right now
pub fn targets(state: &GameState) -> Vec<Position> {
    match state.options.mode {
        DeliveryMode::GoalMarker => state.goal_position.into_iter().collect(),
        DeliveryMode::Packages => {
            if let Some(target) = state.active_target() {
                return vec![target.position];
            }
            if state.packages.len() < state.options.inventory_capacity {
                let shops = state.grid.positions_of(Tile::Shop);
                if !shops.is_empty() {
                    return shops;
                }
            }
            state.coins.clone()
        }
    }
}

/// First step of a shortest path to the nearest target, `None` when the run
/// is over or nothing is reachable.
pub fn next_move(state: &GameState) -> Option<Direction> {
    if state.phase == RunPhase::TimeUp {
        return None;
    }
    let goals = targets(state);
    if goals.is_empty() {
        return None;
    }
    first_step(&state.grid, state.rider_position, &goals, |p| state.is_walkable_at(p))
}

fn first_step(
    grid: &Grid,
    start: Position,
    goals: &[Position],
    walkable: impl Fn(Position) -> bool,
) -> Option<Direction> {
    let index = |p: Position| (p.y * grid.width() + p.x) as usize;
    let mut seen = vec![false; (grid.width() * grid.height()) as usize];
    seen[index(start)] = true;

    // (tile, first direction taken)
    let mut queue = VecDeque::new();
    for dir in Direction::ALL {
        let next = grid.step(start, dir);
        if !seen[index(next)] && walkable(next) {
            seen[index(next)] = true;
            queue.push_back((next, dir));
        }
    }

    while let Some((pos, first)) = queue.pop_front() {
        if goals.contains(&pos) {
            return Some(first);
        }
        for dir in Direction::ALL {
            let next = grid.step(pos, dir);
            if !seen[index(next)] && walkable(next) {
                seen[index(next)] = true;
                queue.push_back((next, first));
            }
        }
    }
    None
}
