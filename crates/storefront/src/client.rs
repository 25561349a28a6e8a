use std::time::Duration;

use async_trait::async_trait;
use giftwise_core::config::StorefrontConfig;
use giftwise_core::{CatalogError, CatalogSource, Product};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, warn};

use crate::graphql::{products_from_response, ProductsRequest, ProductsResponse};

pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";

#[derive(Debug, Error)]
pub enum StorefrontClientError {
    #[error("failed to build storefront http client: {0}")]
    Build(#[source] reqwest::Error),
}

/// Storefront GraphQL API client serving as the product catalog.
pub struct StorefrontClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: SecretString,
    default_currency: String,
}

impl StorefrontClient {
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, StorefrontClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(StorefrontClientError::Build)?;

        Ok(Self {
            http,
            endpoint: config.graphql_endpoint(),
            access_token: config.access_token.clone(),
            default_currency: config.default_currency.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CatalogSource for StorefrontClient {
    async fn fetch_products(&self, limit: usize) -> Result<Vec<Product>, CatalogError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(ACCESS_TOKEN_HEADER, self.access_token.expose_secret())
            .json(&ProductsRequest::new(limit))
            .send()
            .await
            .map_err(|error| CatalogError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                event_name = "storefront.products.status",
                endpoint = %self.endpoint,
                status = %status,
                "storefront rejected products query"
            );
            return Err(CatalogError::Status(status.as_u16()));
        }

        let payload: ProductsResponse =
            response.json().await.map_err(|error| CatalogError::Decode(error.to_string()))?;
        let products = products_from_response(payload, &self.default_currency)?;
        debug!(
            event_name = "storefront.products.fetched",
            product_count = products.len(),
            limit,
            "storefront products decoded"
        );
        Ok(products)
    }
}
