//! `/api/gift-finder` endpoint.
//!
//! Accepts gift criteria as JSON, runs the [`GiftFinder`] and answers with up to
//! three enriched picks. Browsers call this from the storefront domain, so the
//! route carries a CORS layer restricted to that origin.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use giftwise_core::{EnrichedResult, GiftCriteria, GiftFinder, InterfaceError};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use uuid::Uuid;

pub const GIFT_FINDER_PATH: &str = "/api/gift-finder";

#[derive(Clone)]
pub struct GiftFinderState {
    finder: Arc<GiftFinder>,
}

#[derive(Debug, Serialize)]
pub struct GiftFinderResponse {
    pub results: Vec<EnrichedResult>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

pub fn router(finder: Arc<GiftFinder>, allowed_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            GIFT_FINDER_PATH,
            post(find_gifts).options(preflight).fallback(method_not_allowed),
        )
        .layer(cors)
        .with_state(GiftFinderState { finder })
}

async fn find_gifts(State(state): State<GiftFinderState>, body: Bytes) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    info!(
        event_name = "gift_finder.request.received",
        correlation_id = %correlation_id,
        body_bytes = body.len(),
        "gift finder request received"
    );

    let criteria = match parse_criteria(&body) {
        Ok(criteria) => criteria,
        Err(parse_error) => {
            let failure = InterfaceError::Internal { message: parse_error.to_string(), correlation_id };
            error!(
                event_name = "gift_finder.request.unreadable",
                correlation_id = %failure.correlation_id(),
                error = %failure,
                "gift finder request body is not valid JSON"
            );
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &failure);
        }
    };

    match state.finder.recommend(&criteria, &correlation_id).await {
        Ok(outcome) => {
            (StatusCode::OK, Json(GiftFinderResponse { results: outcome.results })).into_response()
        }
        Err(failure) => {
            let failure = failure.into_interface(correlation_id);
            error!(
                event_name = "gift_finder.request.failed",
                correlation_id = %failure.correlation_id(),
                error = %failure,
                "gift finder request failed"
            );
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &failure)
        }
    }
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed(method: Method) -> Response {
    let rejected = InterfaceError::MethodNotAllowed {
        method: method.to_string(),
        correlation_id: Uuid::new_v4().to_string(),
    };
    info!(
        event_name = "gift_finder.request.method_not_allowed",
        correlation_id = %rejected.correlation_id(),
        method = %method,
        "gift finder called with unsupported method"
    );
    error_response(StatusCode::METHOD_NOT_ALLOWED, &rejected)
}

/// An empty (or whitespace-only) body reads as `{}`. Valid JSON of any shape is
/// accepted; only unparseable bodies fail.
fn parse_criteria(body: &[u8]) -> Result<GiftCriteria, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GiftCriteria::default());
    }

    let value: Value = serde_json::from_slice(body)?;
    Ok(GiftCriteria::from_json(&value))
}

fn error_response(status: StatusCode, error: &InterfaceError) -> Response {
    (status, Json(ErrorBody { error: error.user_message() })).into_response()
}
