use serde::{Deserialize, Serialize};

use crate::table::FieldValues;

pub const OG_COLUMNS: &[&str] = &[
    "OG Title",
    "OG Description",
    "OG Image",
    "OG Type",
    "OG URL",
    "OG Site Name",
    "Favicon",
];

/// Open Graph tags and favicon scraped from a project homepage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenGraphData {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub og_type: Option<String>,
    pub url: Option<String>,
    pub site_name: Option<String>,
    pub favicon: Option<String>,
}

impl OpenGraphData {
    /// Only the tags that were found; absent ones leave existing cells alone.
    pub fn to_fields(&self) -> FieldValues {
        [
            ("OG Title", &self.title),
            ("OG Description", &self.description),
            ("OG Image", &self.image),
            ("OG Type", &self.og_type),
            ("OG URL", &self.url),
            ("OG Site Name", &self.site_name),
            ("Favicon", &self.favicon),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.as_ref().map(|v| (column, v.clone())))
        .collect()
    }
}
