mod distance;
mod model;
mod source;
#[cfg(test)]
pub(crate) mod testing;

pub use distance::DistanceMap;
pub use model::{EdgeStyle, EntityId, Fade, Graph, SettleWindow, Shape};
pub use source::{GraphData, load_graph_file};
