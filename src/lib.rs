//! Filtering engine for resistance-gene / mobile-element colocalization
//! networks, plus the dataset, configuration and export plumbing shared by
//! the viewer and the command line.

pub mod config;
pub mod data;
pub mod export;
pub mod filter;
pub mod profile;
pub mod session;
pub mod timepoint;

pub use config::{Config, DatasetSource};
pub use data::{Dataset, Link, LinkCategory, Node, NodeId};
pub use filter::{FilterOptions, FilterState, FilteredGraph};
pub use profile::DatasetProfile;
pub use session::Session;
