//! AI ranking for gift recommendations
//!
//! This crate turns an LLM into a [`RecommendationRanker`]:
//! - builds the ranking prompt from criteria and catalog products (`prompt`)
//! - sends it through a pluggable [`llm::LlmClient`] (`llm`), with an
//!   OpenAI-compatible chat completions client for OpenAI and Ollama
//! - parses the reply tolerantly into an [`AiRanking`] (`ranker`)
//!
//! # Safety Principle
//!
//! The model's answer is untrusted. Transport errors, malformed JSON and empty
//! lists all become non-`Ranked` outcomes, which the core answers with its
//! deterministic fallback ranking. Nothing here returns an error to the caller.
//!
//! [`RecommendationRanker`]: giftwise_core::RecommendationRanker
//! [`AiRanking`]: giftwise_core::AiRanking

pub mod llm;
pub mod prompt;
pub mod ranker;

pub use llm::{LlmClient, OpenAiChatClient};
pub use ranker::{parse_recommendations, AiRanker};
