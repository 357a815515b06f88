pub mod builder;
pub mod data;
pub mod node;
pub mod tree;

pub use builder::Builder;
pub use data::Action;
pub use data::Data;
pub use data::Kind;
pub use node::Node;
pub use tree::Tree;
