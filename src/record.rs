use serde::{Deserialize, Serialize};

/// One normalized browsing-history entry as produced by ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowsingRecord {
    pub date_time: String,
    pub navigated_to_url: String,
    pub page_title: String,
}

impl BrowsingRecord {
    pub fn new(
        date_time: impl Into<String>,
        navigated_to_url: impl Into<String>,
        page_title: impl Into<String>,
    ) -> Self {
        Self {
            date_time: date_time.into(),
            navigated_to_url: navigated_to_url.into(),
            page_title: page_title.into(),
        }
    }
}
