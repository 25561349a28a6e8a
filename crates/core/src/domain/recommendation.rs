use serde::{Deserialize, Serialize};

/// A ranked pick, either from the AI ranker or the fallback heuristic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub handle: String,
    pub title: String,
    pub reason: String,
    pub score: f64,
}

/// A recommendation joined back against its catalog product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnrichedResult {
    pub handle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub reason: String,
    pub score: f64,
}

/// Which ranker produced the final list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingSource {
    Ai,
    Fallback,
}

impl RankingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Fallback => "fallback",
        }
    }
}
