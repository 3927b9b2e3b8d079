pub mod graph;
pub mod hierarchy;

pub use graph::{Graph, GraphMut};
pub use hierarchy::{Hierarchy, Step};
pub use petgraph::graphmap::NodeTrait;
