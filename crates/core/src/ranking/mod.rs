//! Gift ranking
//!
//! Two rankers produce recommendations for a request: an external AI ranker
//! (behind [`RecommendationRanker`]) and the local deterministic
//! [`fallback_rank`] heuristic that stands in whenever the AI outcome is not a
//! usable list.

mod fallback;

pub use fallback::{fallback_rank, tokenize_interests, BudgetWindow, ScoredCandidate};

use async_trait::async_trait;

use crate::domain::{criteria::GiftCriteria, product::Product, recommendation::Recommendation};

/// Maximum recommendations returned per request
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Tolerance applied around the requested budget when choosing the pool
pub const BUDGET_WIGGLE_MARGIN: f64 = 0.25;

/// Reason attached to every fallback recommendation
pub const FALLBACK_REASON: &str = "Matched your interests/budget";

/// Points per interest keyword found in the product text
pub const INTEREST_MATCH_POINTS: u32 = 2;

/// Points for a recipient or occasion match
pub const CONTEXT_MATCH_POINTS: u32 = 1;

/// Points when the exact price sits inside the requested range
pub const STRICT_BUDGET_POINTS: u32 = 1;

/// Outcome of asking the AI ranker. Only `Ranked` is ever used as-is.
#[derive(Clone, Debug, PartialEq)]
pub enum AiRanking {
    Ranked(Vec<Recommendation>),
    Empty,
    Malformed(String),
    Unavailable(String),
}

impl AiRanking {
    /// The usable recommendation list, if any.
    pub fn into_recommendations(self) -> Option<Vec<Recommendation>> {
        match self {
            Self::Ranked(mut recommendations) if !recommendations.is_empty() => {
                recommendations.truncate(MAX_RECOMMENDATIONS);
                Some(recommendations)
            }
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ranked(_) => "ranked",
            Self::Empty => "empty",
            Self::Malformed(_) => "malformed",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

#[async_trait]
pub trait RecommendationRanker: Send + Sync {
    fn name(&self) -> &'static str;
    async fn rank(&self, criteria: &GiftCriteria, products: &[Product]) -> AiRanking;
}

/// Ranker used when no AI provider is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledRanker;

#[async_trait]
impl RecommendationRanker for DisabledRanker {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn rank(&self, _criteria: &GiftCriteria, _products: &[Product]) -> AiRanking {
        AiRanking::Unavailable("ai ranking disabled".to_string())
    }
}
