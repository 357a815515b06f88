pub mod card;
pub mod deal;
pub mod indexer;
