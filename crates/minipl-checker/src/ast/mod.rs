pub mod builder;
pub mod nodes;

pub use builder::TreeBuilder;
pub use nodes::*;
