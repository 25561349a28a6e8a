//! Request orchestration: catalog fetch, AI ranking with local fallback, enrichment.

use std::sync::Arc;

use tracing::{info, warn};

use crate::catalog::{Catalog, CatalogSource};
use crate::domain::criteria::GiftCriteria;
use crate::domain::recommendation::{EnrichedResult, RankingSource};
use crate::enrichment::enrich;
use crate::errors::ApplicationError;
use crate::ranking::{fallback_rank, AiRanking, RecommendationRanker};

/// Settings the finder needs from the application config.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GiftFinderSettings {
    pub storefront_domain: String,
    pub product_limit: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GiftFinderOutcome {
    pub results: Vec<EnrichedResult>,
    pub source: RankingSource,
    pub candidate_count: usize,
}

pub struct GiftFinder {
    settings: GiftFinderSettings,
    catalog: Arc<dyn CatalogSource>,
    ranker: Arc<dyn RecommendationRanker>,
}

impl GiftFinder {
    pub fn new(
        settings: GiftFinderSettings,
        catalog: Arc<dyn CatalogSource>,
        ranker: Arc<dyn RecommendationRanker>,
    ) -> Self {
        Self { settings, catalog, ranker }
    }

    pub fn settings(&self) -> &GiftFinderSettings {
        &self.settings
    }

    pub fn ranker_name(&self) -> &'static str {
        self.ranker.name()
    }

    /// Produces up to three enriched gift picks for `criteria`.
    ///
    /// Catalog failures are returned as errors. AI ranking problems never are:
    /// any outcome other than a non-empty ranked list switches to the fallback
    /// ranker over the same products.
    pub async fn recommend(
        &self,
        criteria: &GiftCriteria,
        correlation_id: &str,
    ) -> Result<GiftFinderOutcome, ApplicationError> {
        if self.settings.product_limit == 0 {
            return Err(ApplicationError::Configuration(
                "product limit must be at least 1".to_string(),
            ));
        }

        let products = self.catalog.fetch_products(self.settings.product_limit).await?;
        info!(
            event_name = "gift_finder.catalog.fetched",
            correlation_id,
            product_count = products.len(),
            "catalog products fetched"
        );

        let outcome = self.ranker.rank(criteria, &products).await;
        let outcome_label = outcome.label();
        info!(
            event_name = "gift_finder.ranking.outcome",
            correlation_id,
            ranker = self.ranker.name(),
            outcome = outcome_label,
            "ai ranking finished"
        );
        let detail = match &outcome {
            AiRanking::Malformed(reason) | AiRanking::Unavailable(reason) => reason.clone(),
            AiRanking::Ranked(_) | AiRanking::Empty => "no recommendations returned".to_string(),
        };

        let (recommendations, source) = match outcome.into_recommendations() {
            Some(recommendations) => (recommendations, RankingSource::Ai),
            None => {
                let fallback = fallback_rank(&products, criteria);
                warn!(
                    event_name = "gift_finder.ranking.fallback",
                    correlation_id,
                    ranker = self.ranker.name(),
                    outcome = outcome_label,
                    detail = %detail,
                    recommendation_count = fallback.len(),
                    "using fallback ranking"
                );
                (fallback, RankingSource::Fallback)
            }
        };

        let catalog = Catalog::new(products);
        let results = enrich(&recommendations, &catalog, &self.settings.storefront_domain);
        info!(
            event_name = "gift_finder.request.completed",
            correlation_id,
            source = source.as_str(),
            result_count = results.len(),
            "gift recommendations ready"
        );

        Ok(GiftFinderOutcome { results, source, candidate_count: catalog.len() })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use super::{GiftFinder, GiftFinderSettings};
    use crate::catalog::{Catalog, CatalogError, CatalogSource};
    use crate::domain::criteria::GiftCriteria;
    use crate::domain::product::Product;
    use crate::domain::recommendation::{EnrichedResult, RankingSource, Recommendation};
    use crate::enrichment::enrich;
    use crate::errors::ApplicationError;
    use crate::ranking::{fallback_rank, AiRanking, RecommendationRanker};

    struct StaticCatalog {
        products: Vec<Product>,
        requested_limits: Mutex<Vec<usize>>,
    }

    impl StaticCatalog {
        fn new(products: Vec<Product>) -> Self {
            Self { products, requested_limits: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl CatalogSource for StaticCatalog {
        async fn fetch_products(&self, limit: usize) -> Result<Vec<Product>, CatalogError> {
            if let Ok(mut limits) = self.requested_limits.lock() {
                limits.push(limit);
            }
            Ok(self.products.iter().take(limit).cloned().collect())
        }
    }

    struct BrokenCatalog;

    #[async_trait]
    impl CatalogSource for BrokenCatalog {
        async fn fetch_products(&self, _limit: usize) -> Result<Vec<Product>, CatalogError> {
            Err(CatalogError::Transport("connection refused".to_string()))
        }
    }

    struct ScriptedRanker {
        outcome: AiRanking,
    }

    #[async_trait]
    impl RecommendationRanker for ScriptedRanker {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn rank(&self, _criteria: &GiftCriteria, _products: &[Product]) -> AiRanking {
            self.outcome.clone()
        }
    }

    fn products() -> Vec<Product> {
        vec![
            Product {
                handle: "golf-balls".to_string(),
                title: "Golf Balls".to_string(),
                tags: vec!["golf".to_string()],
                price: 900.0,
                currency: "INR".to_string(),
                ..Product::default()
            },
            Product {
                handle: "coffee-mug".to_string(),
                title: "Coffee Mug".to_string(),
                description: "for dad".to_string(),
                price: 350.0,
                currency: "INR".to_string(),
                ..Product::default()
            },
            Product {
                handle: "desk-lamp".to_string(),
                title: "Desk Lamp".to_string(),
                price: 2200.0,
                currency: "INR".to_string(),
                ..Product::default()
            },
        ]
    }

    fn criteria() -> GiftCriteria {
        GiftCriteria {
            recipient: Some("dad".to_string()),
            interests: Some("golf coffee".to_string()),
            budget_min: Some(json!(300)),
            budget_max: Some(json!("1000")),
            ..GiftCriteria::default()
        }
    }

    fn finder(catalog: Arc<dyn CatalogSource>, outcome: AiRanking) -> GiftFinder {
        GiftFinder::new(
            GiftFinderSettings {
                storefront_domain: "gifts.example.com".to_string(),
                product_limit: 30,
            },
            catalog,
            Arc::new(ScriptedRanker { outcome }),
        )
    }

    fn expected_fallback() -> Vec<EnrichedResult> {
        let products = products();
        let recommendations = fallback_rank(&products, &criteria());
        enrich(&recommendations, &Catalog::new(products), "gifts.example.com")
    }

    #[tokio::test]
    async fn ai_recommendations_are_used_when_present() {
        let outcome = AiRanking::Ranked(vec![Recommendation {
            handle: "desk-lamp".to_string(),
            title: String::new(),
            reason: "Bright idea".to_string(),
            score: 8.0,
        }]);
        let finder = finder(Arc::new(StaticCatalog::new(products())), outcome);

        let result = finder.recommend(&criteria(), "req-ai").await.expect("should recommend");

        assert_eq!(result.source, RankingSource::Ai);
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].handle, "desk-lamp");
        assert_eq!(result.results[0].title.as_deref(), Some("Desk Lamp"));
        assert_eq!(result.results[0].price, Some(2200.0));
        assert_eq!(result.candidate_count, 3);
    }

    #[tokio::test]
    async fn empty_ai_answer_matches_fallback_output() {
        let finder = finder(Arc::new(StaticCatalog::new(products())), AiRanking::Ranked(vec![]));

        let result = finder.recommend(&criteria(), "req-empty").await.expect("should recommend");

        assert_eq!(result.source, RankingSource::Fallback);
        assert_eq!(result.results, expected_fallback());
    }

    #[tokio::test]
    async fn every_non_ranked_outcome_triggers_fallback() {
        for outcome in [
            AiRanking::Empty,
            AiRanking::Malformed("expected value at line 1".to_string()),
            AiRanking::Unavailable("connection reset".to_string()),
        ] {
            let finder = finder(Arc::new(StaticCatalog::new(products())), outcome);

            let result = finder.recommend(&criteria(), "req-fail").await.expect("should recommend");

            assert_eq!(result.source, RankingSource::Fallback);
            assert_eq!(result.results, expected_fallback());
        }
    }

    #[tokio::test]
    async fn fallback_prefers_keyword_matches_in_budget() {
        let finder = finder(Arc::new(StaticCatalog::new(products())), AiRanking::Empty);

        let result = finder.recommend(&criteria(), "req-order").await.expect("should recommend");

        let handles: Vec<&str> =
            result.results.iter().map(|result| result.handle.as_str()).collect();
        assert_eq!(handles, vec!["coffee-mug", "golf-balls"]);
        assert_eq!(result.results[0].score, 4.0);
        assert_eq!(result.results[1].score, 3.0);
    }

    #[tokio::test]
    async fn catalog_limit_comes_from_settings() {
        let catalog = Arc::new(StaticCatalog::new(products()));
        let finder = finder(catalog.clone(), AiRanking::Empty);

        finder.recommend(&GiftCriteria::default(), "req-limit").await.expect("should recommend");

        let limits = catalog.requested_limits.lock().map(|limits| limits.clone()).unwrap_or_default();
        assert_eq!(limits, vec![30]);
    }

    #[tokio::test]
    async fn catalog_failure_is_surfaced() {
        let finder = finder(Arc::new(BrokenCatalog), AiRanking::Empty);

        let error = finder
            .recommend(&criteria(), "req-broken")
            .await
            .expect_err("catalog failure should propagate");

        assert!(matches!(error, ApplicationError::Catalog(CatalogError::Transport(_))));
    }

    #[tokio::test]
    async fn empty_catalog_returns_no_results() {
        let finder = finder(Arc::new(StaticCatalog::new(Vec::new())), AiRanking::Empty);

        let result = finder.recommend(&criteria(), "req-none").await.expect("should recommend");

        assert!(result.results.is_empty());
        assert_eq!(result.source, RankingSource::Fallback);
    }

    #[tokio::test]
    async fn zero_product_limit_is_a_configuration_error() {
        let finder = GiftFinder::new(
            GiftFinderSettings { storefront_domain: "gifts.example.com".to_string(), product_limit: 0 },
            Arc::new(StaticCatalog::new(products())),
            Arc::new(ScriptedRanker { outcome: AiRanking::Empty }),
        );

        let error = finder
            .recommend(&criteria(), "req-zero")
            .await
            .expect_err("zero limit should be rejected");

        assert!(matches!(error, ApplicationError::Configuration(_)));
    }
}
