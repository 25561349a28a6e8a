use serde::{Deserialize, Serialize};

/// A storefront product as seen by the ranker. Immutable for one request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub vendor: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub tags: Vec<String>,
    pub description: String,
    pub price: f64,
    pub currency: String,
    pub image: Option<String>,
}

impl Product {
    /// Lower-cased haystack used for keyword matching.
    pub fn search_text(&self) -> String {
        [
            self.title.as_str(),
            self.vendor.as_str(),
            self.product_type.as_str(),
            &self.tags.join(" "),
            self.description.as_str(),
        ]
        .join(" ")
        .to_lowercase()
    }
}
