use async_trait::async_trait;
use giftwise_core::ranking::MAX_RECOMMENDATIONS;
use giftwise_core::{AiRanking, GiftCriteria, Product, Recommendation, RecommendationRanker};
use serde_json::Value;
use tracing::debug;

use crate::llm::LlmClient;
use crate::prompt::{RankingPrompt, SYSTEM_PROMPT};

const CONTENT_PREVIEW_CHARS: usize = 300;

/// Ranks products by asking an LLM. Never fails; problems become non-`Ranked`
/// outcomes.
pub struct AiRanker<C> {
    client: C,
    name: &'static str,
}

impl<C> AiRanker<C>
where
    C: LlmClient,
{
    pub fn new(client: C, name: &'static str) -> Self {
        Self { client, name }
    }
}

#[async_trait]
impl<C> RecommendationRanker for AiRanker<C>
where
    C: LlmClient,
{
    fn name(&self) -> &'static str {
        self.name
    }

    async fn rank(&self, criteria: &GiftCriteria, products: &[Product]) -> AiRanking {
        let prompt = match RankingPrompt::new(criteria, products).to_json() {
            Ok(prompt) => prompt,
            Err(error) => return AiRanking::Unavailable(format!("prompt encoding failed: {error}")),
        };

        match self.client.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(content) => {
                let preview: String = content.chars().take(CONTENT_PREVIEW_CHARS).collect();
                debug!(
                    event_name = "gift_finder.ranking.ai_content",
                    ranker = self.name,
                    content = %preview,
                    "ai ranker replied"
                );
                parse_recommendations(&content)
            }
            Err(error) => AiRanking::Unavailable(format!("{error:#}")),
        }
    }
}

/// Reads the model reply. Entries without a string `handle` are dropped; the
/// remaining fields are optional. Keeps at most three entries.
pub fn parse_recommendations(content: &str) -> AiRanking {
    let parsed: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(error) => return AiRanking::Malformed(error.to_string()),
    };

    let Some(entries) = parsed.get("recommendations").and_then(Value::as_array) else {
        return AiRanking::Empty;
    };

    let recommendations: Vec<Recommendation> =
        entries.iter().filter_map(recommendation_from).take(MAX_RECOMMENDATIONS).collect();

    if recommendations.is_empty() {
        AiRanking::Empty
    } else {
        AiRanking::Ranked(recommendations)
    }
}

fn recommendation_from(entry: &Value) -> Option<Recommendation> {
    let handle = entry.get("handle").and_then(Value::as_str).filter(|handle| !handle.is_empty())?;
    let text = |key: &str| entry.get(key).and_then(Value::as_str).unwrap_or_default().to_string();

    Some(Recommendation {
        handle: handle.to_string(),
        title: text("title"),
        reason: text("reason"),
        score: entry.get("score").map(score_from).unwrap_or(0.0),
    })
}

fn score_from(value: &Value) -> f64 {
    let score = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    score.filter(|score| score.is_finite()).unwrap_or(0.0)
}
