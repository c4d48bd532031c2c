pub mod fetcher;
pub mod open_graph;

pub use fetcher::{HttpPageFetcher, PageFetcher};
pub use open_graph::parse_open_graph;
