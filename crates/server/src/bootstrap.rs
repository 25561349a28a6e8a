use std::sync::Arc;

use axum::{http::HeaderValue, Router};
use giftwise_agent::{AiRanker, OpenAiChatClient};
use giftwise_core::config::{AppConfig, ConfigError, LlmConfig, LlmProvider};
use giftwise_core::{CatalogSource, DisabledRanker, GiftFinder, RecommendationRanker};
use giftwise_storefront::{StorefrontClient, StorefrontClientError};
use thiserror::Error;
use tracing::{info, warn};

use crate::{gift_finder, health};

pub struct Application {
    pub config: AppConfig,
    pub router: Router,
    pub ranker_name: &'static str,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("storefront domain `{0}` is not a valid CORS origin")]
    InvalidOrigin(String),
    #[error(transparent)]
    Storefront(#[from] StorefrontClientError),
    #[error("failed to build llm client: {0}")]
    LlmClient(String),
}

/// Wires collaborators from an already validated config.
pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let allowed_origin = HeaderValue::from_str(&config.storefront.allowed_origin())
        .map_err(|_| BootstrapError::InvalidOrigin(config.storefront.domain.clone()))?;

    let catalog: Arc<dyn CatalogSource> =
        Arc::new(StorefrontClient::from_config(&config.storefront)?);
    let ranker = build_ranker(&config.llm)?;
    let ranker_name = ranker.name();
    info!(
        event_name = "system.bootstrap.collaborators_ready",
        correlation_id = "bootstrap",
        ranker = ranker_name,
        storefront_domain = %config.storefront.domain,
        product_limit = config.storefront.product_limit,
        "catalog and ranker initialized"
    );

    let finder = Arc::new(GiftFinder::new(config.finder_settings(), catalog.clone(), ranker));
    let router = gift_finder::router(finder, allowed_origin)
        .merge(health::router(catalog, ranker_name));

    Ok(Application { config, router, ranker_name })
}

fn build_ranker(config: &LlmConfig) -> Result<Arc<dyn RecommendationRanker>, BootstrapError> {
    match config.provider {
        LlmProvider::Disabled => Ok(Arc::new(DisabledRanker)),
        provider if !config.ai_ranking_available() => {
            warn!(
                event_name = "system.bootstrap.ranker_degraded",
                correlation_id = "bootstrap",
                provider = provider.as_str(),
                "llm.api_key is not set; requests use the fallback ranker"
            );
            Ok(Arc::new(DisabledRanker))
        }
        provider => {
            let client = OpenAiChatClient::from_config(config)
                .map_err(|error| BootstrapError::LlmClient(format!("{error:#}")))?;
            Ok(Arc::new(AiRanker::new(client, provider.as_str())))
        }
    }
}
