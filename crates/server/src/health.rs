use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use giftwise_core::CatalogSource;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    catalog: Arc<dyn CatalogSource>,
    ranker_name: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub catalog: HealthCheck,
    pub ranker: HealthCheck,
    pub checked_at: String,
}

pub fn router(catalog: Arc<dyn CatalogSource>, ranker_name: &'static str) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { catalog, ranker_name })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let catalog = catalog_check(state.catalog.as_ref()).await;
    let ready = catalog.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "giftwise-server runtime initialized".to_string(),
        },
        catalog,
        ranker: ranker_check(state.ranker_name),
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn catalog_check(catalog: &dyn CatalogSource) -> HealthCheck {
    match catalog.fetch_products(1).await {
        Ok(_) => HealthCheck { status: "ready", detail: "catalog query succeeded".to_string() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("catalog query failed: {error}") }
        }
    }
}

// Always ready: without AI, requests use the fallback ranker.
fn ranker_check(ranker_name: &'static str) -> HealthCheck {
    let detail = if ranker_name == "disabled" {
        "ai ranking disabled; fallback ranker only".to_string()
    } else {
        format!("ai ranking via {ranker_name}")
    };
    HealthCheck { status: "ready", detail }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{extract::State, http::StatusCode, Json};
    use giftwise_core::{CatalogError, CatalogSource, Product};

    use crate::health::{health, HealthState};

    struct StubCatalog {
        reachable: bool,
    }

    #[async_trait]
    impl CatalogSource for StubCatalog {
        async fn fetch_products(&self, _limit: usize) -> Result<Vec<Product>, CatalogError> {
            if self.reachable {
                Ok(vec![Product::default()])
            } else {
                Err(CatalogError::Transport("connection refused".to_string()))
            }
        }
    }

    #[tokio::test]
    async fn health_returns_ready_when_catalog_is_reachable() {
        let state = HealthState { catalog: Arc::new(StubCatalog { reachable: true }), ranker_name: "openai" };

        let (status, Json(payload)) = health(State(state)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.catalog.status, "ready");
        assert_eq!(payload.ranker.detail, "ai ranking via openai");
        assert_eq!(payload.service.status, "ready");
    }

    #[tokio::test]
    async fn health_returns_service_unavailable_when_catalog_is_unreachable() {
        let state =
            HealthState { catalog: Arc::new(StubCatalog { reachable: false }), ranker_name: "disabled" };

        let (status, Json(payload)) = health(State(state)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.catalog.status, "degraded");
        assert!(payload.catalog.detail.contains("connection refused"));
        assert_eq!(payload.ranker.status, "ready");
    }
}
