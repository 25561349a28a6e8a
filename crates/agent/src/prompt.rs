use giftwise_core::ranking::{BUDGET_WIGGLE_MARGIN, MAX_RECOMMENDATIONS};
use giftwise_core::{GiftCriteria, Product};
use serde::Serialize;

pub const SYSTEM_PROMPT: &str = "You are an ecommerce gift assistant. Output valid JSON only.";

/// User message sent to the model: the criteria, ranking rules and the catalog.
#[derive(Debug, Serialize)]
pub struct RankingPrompt<'a> {
    pub criteria: &'a GiftCriteria,
    pub instructions: Vec<String>,
    pub products: &'a [Product],
    pub handles: Vec<&'a str>,
}

impl<'a> RankingPrompt<'a> {
    pub fn new(criteria: &'a GiftCriteria, products: &'a [Product]) -> Self {
        Self {
            criteria,
            instructions: instructions(),
            products,
            handles: products.iter().map(|product| product.handle.as_str()).collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn instructions() -> Vec<String> {
    let margin_pct = (BUDGET_WIGGLE_MARGIN * 100.0).round() as u32;
    vec![
        format!("Pick the BEST {MAX_RECOMMENDATIONS} products from the list."),
        "Prefer diversity (type/brand).".to_string(),
        format!("Respect budget if given; allow +/- {margin_pct}%."),
        "Return JSON only: {\"recommendations\":[{\"handle\":\"<handle-from-list>\",\"title\":\"...\",\"reason\":\"...\",\"score\":<number>}]}".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use giftwise_core::{GiftCriteria, Product};
    use serde_json::{json, Value};

    use super::RankingPrompt;

    #[test]
    fn prompt_lists_criteria_products_and_handles() {
        let criteria = GiftCriteria {
            occasion: Some("anniversary".to_string()),
            budget_max: Some(json!("2000")),
            ..GiftCriteria::default()
        };
        let products = vec![
            Product { handle: "rose-gold-watch".to_string(), ..Product::default() },
            Product { handle: "photo-frame".to_string(), ..Product::default() },
        ];

        let prompt = RankingPrompt::new(&criteria, &products).to_json().expect("should serialize");
        let value: Value = serde_json::from_str(&prompt).expect("prompt should be valid json");

        assert_eq!(value["criteria"], json!({ "occasion": "anniversary", "budgetMax": "2000" }));
        assert_eq!(value["handles"], json!(["rose-gold-watch", "photo-frame"]));
        assert_eq!(value["products"][1]["handle"], "photo-frame");
        assert_eq!(value["products"][0]["type"], "");
    }

    #[test]
    fn instructions_state_count_margin_and_output_shape() {
        let criteria = GiftCriteria::default();
        let prompt = RankingPrompt::new(&criteria, &[]);

        assert_eq!(prompt.instructions.len(), 4);
        assert_eq!(prompt.instructions[0], "Pick the BEST 3 products from the list.");
        assert_eq!(prompt.instructions[2], "Respect budget if given; allow +/- 25%.");
        assert!(prompt.instructions[3].contains("\"recommendations\""));
    }
}
