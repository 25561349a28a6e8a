use crate::catalog::Catalog;
use crate::domain::recommendation::{EnrichedResult, Recommendation};

/// Reason used when the ranker supplied none
pub const DEFAULT_REASON: &str = "A good match for your criteria";

pub fn product_url(storefront_domain: &str, handle: &str) -> String {
    format!("https://{storefront_domain}/products/{handle}")
}

/// Joins recommendations against the catalog. Unknown handles keep their
/// recommendation fields and leave the product fields empty.
pub fn enrich(
    recommendations: &[Recommendation],
    catalog: &Catalog,
    storefront_domain: &str,
) -> Vec<EnrichedResult> {
    recommendations
        .iter()
        .map(|recommendation| {
            let product = catalog.find(&recommendation.handle);
            let title = Some(recommendation.title.as_str())
                .filter(|title| !title.is_empty())
                .or_else(|| product.map(|product| product.title.as_str()))
                .filter(|title| !title.is_empty())
                .map(str::to_owned);
            let reason = if recommendation.reason.is_empty() {
                DEFAULT_REASON.to_string()
            } else {
                recommendation.reason.clone()
            };
            let score = if recommendation.score.is_finite() { recommendation.score } else { 0.0 };

            EnrichedResult {
                handle: recommendation.handle.clone(),
                title,
                url: product_url(storefront_domain, &recommendation.handle),
                image: product.and_then(|product| product.image.clone()),
                price: product.map(|product| product.price),
                currency: product.map(|product| product.currency.clone()),
                reason,
                score,
            }
        })
        .collect()
}
