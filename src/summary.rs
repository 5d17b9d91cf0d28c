//! Run summaries and the leaderboard
//!
//! Kept in memory only; tracks the top 10 runs.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::sim::GameState;

/// Maximum number of runs to keep
pub const MAX_ENTRIES: usize = 10;

/// Outcome of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    /// Level reached
    pub level: u32,
    /// Cost-weighted distance over the whole run
    pub distance: u32,
    pub deliveries: u32,
    pub coins: u32,
}

impl RunSummary {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            seed: state.seed,
            level: state.level,
            distance: state.total_distance,
            deliveries: state.deliveries,
            coins: state.coins_collected,
        }
    }

    /// Leaderboard order: more deliveries first, then more coins
    fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .deliveries
            .cmp(&self.deliveries)
            .then(other.coins.cmp(&self.coins))
    }

    fn beats(&self, other: &Self) -> bool {
        self.rank_cmp(other) == Ordering::Less
    }

    fn is_empty(&self) -> bool {
        self.deliveries == 0 && self.coins == 0
    }
}

impl From<&GameState> for RunSummary {
    fn from(state: &GameState) -> Self {
        Self::from_state(state)
    }
}

/// Best runs, sorted
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub entries: Vec<RunSummary>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a run earns a place
    pub fn qualifies(&self, run: &RunSummary) -> bool {
        if run.is_empty() {
            return false;
        }
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().is_none_or(|last| run.beats(last))
    }

    /// Rank a run would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, run: &RunSummary) -> Option<usize> {
        if !self.qualifies(run) {
            return None;
        }
        let rank = self.entries.iter().position(|e| run.beats(e));
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a run, returning its rank (1-indexed) or None if it didn't qualify
    pub fn add(&mut self, run: RunSummary) -> Option<usize> {
        let rank = self.potential_rank(&run)?;
        self.entries.insert(rank - 1, run);
        self.entries.truncate(MAX_ENTRIES);
        Some(rank)
    }

    pub fn best(&self) -> Option<&RunSummary> {
        self.entries.first()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
