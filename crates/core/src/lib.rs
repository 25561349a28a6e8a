//! Giftwise core: gift recommendation domain, ranking and orchestration.
//!
//! The [`finder::GiftFinder`] drives one request: it pulls candidate products
//! from a [`catalog::CatalogSource`], asks a [`ranking::RecommendationRanker`]
//! (usually an LLM) for the best picks and falls back to the deterministic
//! [`ranking::fallback_rank`] when that answer is unusable. Picks are joined
//! back against the catalog by [`enrichment::enrich`].

pub mod catalog;
pub mod config;
pub mod domain;
pub mod enrichment;
pub mod errors;
pub mod finder;
pub mod ranking;

pub use catalog::{Catalog, CatalogError, CatalogSource};
pub use domain::criteria::GiftCriteria;
pub use domain::product::Product;
pub use domain::recommendation::{EnrichedResult, RankingSource, Recommendation};
pub use errors::{ApplicationError, InterfaceError};
pub use finder::{GiftFinder, GiftFinderOutcome, GiftFinderSettings};
pub use ranking::{fallback_rank, AiRanking, DisabledRanker, RecommendationRanker};
