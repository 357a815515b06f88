pub mod store;
pub mod values;

pub use store::StrategyStore;
pub use values::Values;
