pub mod favicons;
pub mod previews;

pub use favicons::{generate_favicons, GeneratedIcon, FAVICON_SIZES};
pub use previews::{
    collect_previews, distribute_template, scan_previews, DistributeOptions, LocalRepos,
};
