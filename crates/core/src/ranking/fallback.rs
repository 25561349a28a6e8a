//! Deterministic keyword and budget ranking used when the AI ranker has no answer

use super::{
    BUDGET_WIGGLE_MARGIN, CONTEXT_MATCH_POINTS, FALLBACK_REASON, INTEREST_MATCH_POINTS,
    MAX_RECOMMENDATIONS, STRICT_BUDGET_POINTS,
};
use crate::domain::{criteria::GiftCriteria, product::Product, recommendation::Recommendation};

/// Requested price range resolved from raw criteria.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BudgetWindow {
    pub min: f64,
    pub max: f64,
}

impl BudgetWindow {
    pub fn from_criteria(criteria: &GiftCriteria) -> Self {
        Self { min: criteria.budget_floor(), max: criteria.budget_ceiling() }
    }

    pub fn has_ceiling(&self) -> bool {
        self.max.is_finite()
    }

    /// Pool membership test, widened by the wiggle margin on both ends.
    pub fn admits_with_margin(&self, price: f64) -> bool {
        let above_floor = price >= self.min * (1.0 - BUDGET_WIGGLE_MARGIN);
        let below_ceiling =
            !self.has_ceiling() || price <= self.max * (1.0 + BUDGET_WIGGLE_MARGIN);
        above_floor && below_ceiling
    }

    /// Exact containment; only meaningful when a ceiling was given.
    pub fn contains_strictly(&self, price: f64) -> bool {
        self.has_ceiling() && price >= self.min && price <= self.max
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub product: &'a Product,
    pub score: u32,
}

/// Splits free-text interests into lower-cased keywords on commas and whitespace.
pub fn tokenize_interests(interests: &str) -> Vec<String> {
    interests
        .to_lowercase()
        .split(|ch: char| ch == ',' || ch.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Ranks `products` against `criteria` and returns at most three picks.
///
/// Products inside the budget band (±25%) form the pool; when none qualify the
/// whole list is ranked instead. Each interest keyword found in the product
/// text is worth 2 points, a recipient or occasion match 1 point each, and a
/// price inside the literal range 1 point when a ceiling was given. Ties go to
/// the cheaper product, then to catalog order.
pub fn fallback_rank(products: &[Product], criteria: &GiftCriteria) -> Vec<Recommendation> {
    let keywords = tokenize_interests(criteria.interests().unwrap_or_default());
    let recipient = criteria.recipient().map(str::to_lowercase);
    let occasion = criteria.occasion().map(str::to_lowercase);
    let budget = BudgetWindow::from_criteria(criteria);

    let within_budget: Vec<&Product> =
        products.iter().filter(|product| budget.admits_with_margin(product.price)).collect();
    let pool = if within_budget.is_empty() { products.iter().collect() } else { within_budget };

    let mut scored: Vec<ScoredCandidate<'_>> = pool
        .into_iter()
        .map(|product| {
            let text = product.search_text();
            let mut score = 0;

            for keyword in &keywords {
                if text.contains(keyword.as_str()) {
                    score += INTEREST_MATCH_POINTS;
                }
            }
            if recipient.as_deref().is_some_and(|term| text.contains(term)) {
                score += CONTEXT_MATCH_POINTS;
            }
            if occasion.as_deref().is_some_and(|term| text.contains(term)) {
                score += CONTEXT_MATCH_POINTS;
            }
            if budget.contains_strictly(product.price) {
                score += STRICT_BUDGET_POINTS;
            }

            ScoredCandidate { product, score }
        })
        .collect();

    scored.sort_by(|left, right| {
        right.score.cmp(&left.score).then_with(|| left.product.price.total_cmp(&right.product.price))
    });

    scored
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|candidate| Recommendation {
            handle: candidate.product.handle.clone(),
            title: candidate.product.title.clone(),
            reason: FALLBACK_REASON.to_string(),
            score: f64::from(candidate.score),
        })
        .collect()
}
