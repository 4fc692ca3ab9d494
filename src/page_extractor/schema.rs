use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceBytes {
    pub script: f64,
    pub stylesheet: f64,
    pub image: f64,
    pub font: f64,
    pub xhr: f64,
    pub other: f64,
}

impl ResourceBytes {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.script + self.stylesheet + self.image + self.font + self.xhr + self.other
    }
}

/// Timings in milliseconds relative to navigation start
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceTimings {
    pub load_time: f64,
    pub first_contentful_paint: f64,
    pub time_to_interactive: f64,
    pub dom_content_loaded: f64,
    pub dom_nodes: u64,
    pub request_count: u64,
    pub document_bytes: f64,
    pub resource_bytes: ResourceBytes,
}

impl PerformanceTimings {
    #[must_use]
    pub fn total_bytes(&self) -> f64 {
        self.document_bytes + self.resource_bytes.total()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeoSignals {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub h1_count: u32,
    pub h2_count: u32,
    pub h3_count: u32,
    pub images_total: u32,
    pub images_missing_alt: u32,
    pub internal_links: u32,
    pub external_links: u32,
    pub has_viewport: bool,
    pub canonical: Option<String>,
    pub lang: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixedContentItem {
    /// image, script, link or iframe
    pub kind: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageStructure {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub headings: Vec<Heading>,
    pub h1_count: u32,
    pub h2_count: u32,
    pub paragraph_count: u32,
    pub word_count: u32,
    pub cta_count: u32,
    pub cta_texts: Vec<String>,
    pub form_count: u32,
    pub has_contact_form: bool,
    pub image_count: u32,
    pub images_missing_alt: u32,
    pub has_navigation: bool,
    pub has_email: bool,
    pub has_phone: bool,
    pub social_links: Vec<String>,
    pub has_viewport: bool,
}
