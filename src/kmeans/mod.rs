pub mod engine;
pub mod neighbors;

pub use engine::KMeansEngine;
