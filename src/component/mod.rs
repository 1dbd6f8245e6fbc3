pub mod builder;
pub mod tree;
pub mod view;

pub use builder::ComponentBuilder;
pub use tree::{locals_from, ComponentTree, Locals, NodeId, Resolved};
pub use view::ComponentView;
