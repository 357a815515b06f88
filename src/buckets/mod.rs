pub mod store;

pub use store::Buckets;
