mod cache;
mod load;
mod model;
mod parse;

pub use cache::DatasetCache;
pub use load::load_dataset;
pub use model::{Dataset, Link, LinkCategory, Node, NodeId};
pub use parse::parse_dataset;
