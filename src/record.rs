use serde::{Deserialize, Serialize};

use crate::segment::Segments;

/// Metadata read from a tool's own page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
}

/// One tool as listed under one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRecord {
    pub category: String,
    pub name: String,
    pub metric_raw: Option<String>,
    pub metric_value: Option<u64>,
    pub description_preview: String,
    pub url: String,
    pub raw_text: String,
    pub page_title: Option<String>,
    pub page_meta_description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ToolRecord {
    pub fn from_listing(category: &str, url: &str, raw_text: &str, seg: Segments) -> Self {
        ToolRecord {
            category: category.to_string(),
            name: seg.name,
            metric_raw: seg.metric_raw,
            metric_value: seg.metric_value,
            description_preview: seg.description.unwrap_or_default(),
            url: url.to_string(),
            raw_text: raw_text.to_string(),
            page_title: None,
            page_meta_description: None,
            image_url: None,
            tags: Vec::new(),
        }
    }

    pub fn apply(&mut self, e: Enrichment) {
        self.page_title = e.title;
        self.page_meta_description = e.meta_description;
        self.image_url = e.image_url;
        self.tags = e.tags;
    }
}
