use std::fs;
use std::path::PathBuf;

use clap::Args;
use giftwise_core::{fallback_rank, GiftCriteria, Product, Recommendation};
use serde::Serialize;
use serde_json::Value;

use super::{CommandResult, EXIT_FAILURE};

#[derive(Debug, Args)]
pub struct RankArgs {
    #[arg(long, help = "Path to a JSON array of products")]
    pub catalog: PathBuf,
    #[arg(long, help = "Comma or space separated interest keywords")]
    pub interests: Option<String>,
    #[arg(long)]
    pub recipient: Option<String>,
    #[arg(long)]
    pub occasion: Option<String>,
    #[arg(long)]
    pub budget_min: Option<String>,
    #[arg(long)]
    pub budget_max: Option<String>,
}

impl RankArgs {
    /// Budgets go through as strings, the same way the HTTP surface accepts them.
    pub fn criteria(&self) -> GiftCriteria {
        GiftCriteria {
            recipient: self.recipient.clone(),
            occasion: self.occasion.clone(),
            interests: self.interests.clone(),
            budget_min: self.budget_min.clone().map(Value::String),
            budget_max: self.budget_max.clone().map(Value::String),
        }
    }
}

#[derive(Debug, Serialize)]
struct RankOutput<'a> {
    command: &'static str,
    status: &'static str,
    candidate_count: usize,
    criteria: &'a GiftCriteria,
    recommendations: Vec<Recommendation>,
}

pub fn run(args: &RankArgs) -> CommandResult {
    let raw = match fs::read_to_string(&args.catalog) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure(
                "rank",
                "catalog_read",
                format!("failed to read `{}`: {error}", args.catalog.display()),
                EXIT_FAILURE,
            );
        }
    };

    let products: Vec<Product> = match serde_json::from_str(&raw) {
        Ok(products) => products,
        Err(error) => {
            return CommandResult::failure(
                "rank",
                "catalog_parse",
                format!("`{}` is not a JSON array of products: {error}", args.catalog.display()),
                EXIT_FAILURE,
            );
        }
    };

    let criteria = args.criteria();
    let output = RankOutput {
        command: "rank",
        status: "ok",
        candidate_count: products.len(),
        criteria: &criteria,
        recommendations: fallback_rank(&products, &criteria),
    };

    match serde_json::to_string_pretty(&output) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure("rank", "serialization", error.to_string(), EXIT_FAILURE),
    }
}
