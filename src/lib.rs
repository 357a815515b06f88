pub mod assemble;
pub mod board;
pub mod buckets;
pub mod cards;
pub mod config;
pub mod expand;
pub mod game;
pub mod kmeans;
pub mod save;
pub mod strategy;
pub mod tree;

/// accumulated strategy weights normalize into these
pub type Probability = f64;
/// distances in feature space are cheap and plentiful
pub type Energy = f32;
/// pot sizes and stack depths
pub type Chips = u32;

/// translation weights must conserve mass up to this
pub const WEIGHT_TOLERANCE: f64 = 1e-9;
