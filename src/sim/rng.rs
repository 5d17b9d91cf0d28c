//! Layout RNG
//!
//! Park-Miller (MINSTD, multiplier 16807) generator used for everything that
//! must be a pure function of `(seed, level)`: terrain and coin layout.
//! Session randomness (deflection, slips, package kinds) uses the `Pcg32`
//! stored in `GameState` instead.

/// Modulus 2^31 - 1
const MODULUS: u64 = 2_147_483_647;
const MULTIPLIER: u64 = 16_807;

/// Seed offset per level for terrain generation
pub const TERRAIN_LEVEL_STRIDE: u64 = 997;
/// Seed offset per level for coin placement
pub const COIN_LEVEL_STRIDE: u64 = 4243;
/// Extra offset so coin seeds never line up with terrain seeds
pub const COIN_SEED_OFFSET: u64 = 99;
/// Seed offset per regeneration of the same level
pub const REGEN_STRIDE: u64 = 7919;

/// Deterministic float stream in [0, 1)
#[derive(Debug, Clone)]
pub struct LayoutRng {
    state: u64,
}

impl LayoutRng {
    /// Seed is normalized into [1, 2147483646]
    pub fn new(seed: u64) -> Self {
        let mut state = seed % MODULUS;
        if state == 0 {
            state = MODULUS - 1;
        }
        Self { state }
    }

    /// Next float in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * MULTIPLIER) % MODULUS;
        (self.state - 1) as f64 / (MODULUS - 1) as f64
    }

    /// True with probability `p`
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform index in [0, len). `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        let idx = (self.next_f64() * len as f64) as usize;
        idx.min(len.saturating_sub(1))
    }
}

fn regen_offset(regen: u32) -> u64 {
    u64::from(regen).wrapping_mul(REGEN_STRIDE)
}

/// Seed for the terrain of a given level. `regen` counts how many times the
/// level was regenerated; 0 is the layout a level-up lands on.
pub fn terrain_seed(seed: u64, level: u32, regen: u32) -> u64 {
    seed.wrapping_add(u64::from(level).wrapping_mul(TERRAIN_LEVEL_STRIDE))
        .wrapping_add(regen_offset(regen))
}

/// Seed for the coin layout of a given level
pub fn coin_seed(seed: u64, level: u32, regen: u32) -> u64 {
    seed.wrapping_add(u64::from(level).wrapping_mul(COIN_LEVEL_STRIDE))
        .wrapping_add(COIN_SEED_OFFSET)
        .wrapping_add(regen_offset(regen))
}
