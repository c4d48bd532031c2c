pub mod github;
pub mod metadata;
pub mod open_graph;

pub use github::*;
pub use metadata::*;
pub use open_graph::*;
