use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Caller-supplied gift search criteria. Every field is optional; unset fields
/// contribute nothing to filtering or scoring.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<String>,
    /// Raw budget input as sent by the caller (number or numeric string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_min: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_max: Option<Value>,
}

impl GiftCriteria {
    /// Reads criteria from an arbitrary JSON request body.
    ///
    /// Anything other than an object yields empty criteria. Text fields that are
    /// not strings are left unset; budgets are kept raw for [`budget_amount`].
    pub fn from_json(body: &Value) -> Self {
        let Some(fields) = body.as_object() else {
            return Self::default();
        };
        let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);
        let budget = |key: &str| fields.get(key).filter(|value| !value.is_null()).cloned();

        Self {
            recipient: text("recipient"),
            occasion: text("occasion"),
            interests: text("interests"),
            budget_min: budget("budgetMin"),
            budget_max: budget("budgetMax"),
        }
    }

    pub fn recipient(&self) -> Option<&str> {
        non_empty(self.recipient.as_deref())
    }

    pub fn occasion(&self) -> Option<&str> {
        non_empty(self.occasion.as_deref())
    }

    pub fn interests(&self) -> Option<&str> {
        non_empty(self.interests.as_deref())
    }

    /// Lower bound in store currency; unset or unusable input means 0.
    pub fn budget_floor(&self) -> f64 {
        self.budget_min.as_ref().and_then(budget_amount).unwrap_or(0.0)
    }

    /// Upper bound in store currency; unset or unusable input means unbounded.
    pub fn budget_ceiling(&self) -> f64 {
        self.budget_max.as_ref().and_then(budget_amount).unwrap_or(f64::INFINITY)
    }
}

/// Coerces a raw budget value into an amount.
///
/// Only finite, non-zero numbers (or strings that parse to one after trimming)
/// produce a value. Zero counts as "not given" so that `budgetMax: 0` reads as
/// no ceiling rather than an impossible one. Booleans, arrays, objects and
/// `null` are ignored.
pub fn budget_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    }?;

    (amount.is_finite() && amount != 0.0).then_some(amount)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{budget_amount, GiftCriteria};

    #[test]
    fn budget_amount_accepts_numbers_and_numeric_strings() {
        assert_eq!(budget_amount(&json!(500)), Some(500.0));
        assert_eq!(budget_amount(&json!(12.5)), Some(12.5));
        assert_eq!(budget_amount(&json!(" 750 ")), Some(750.0));
        assert_eq!(budget_amount(&json!("-20")), Some(-20.0));
    }

    #[test]
    fn budget_amount_rejects_zero_garbage_and_non_finite_values() {
        assert_eq!(budget_amount(&json!(0)), None);
        assert_eq!(budget_amount(&json!("0")), None);
        assert_eq!(budget_amount(&json!("")), None);
        assert_eq!(budget_amount(&json!("cheap")), None);
        assert_eq!(budget_amount(&json!("inf")), None);
        assert_eq!(budget_amount(&json!("NaN")), None);
        assert_eq!(budget_amount(&json!(true)), None);
        assert_eq!(budget_amount(&json!(null)), None);
        assert_eq!(budget_amount(&json!([100])), None);
    }

    #[test]
    fn budget_bounds_default_to_open_range() {
        let criteria = GiftCriteria::default();

        assert_eq!(criteria.budget_floor(), 0.0);
        assert!(criteria.budget_ceiling().is_infinite());
    }

    #[test]
    fn criteria_deserializes_camel_case_body() {
        let criteria: GiftCriteria = serde_json::from_value(json!({
            "recipient": "Dad",
            "interests": "golf, coffee",
            "budgetMin": "500",
            "budgetMax": 1000
        }))
        .expect("criteria should deserialize");

        assert_eq!(criteria.recipient(), Some("Dad"));
        assert_eq!(criteria.occasion(), None);
        assert_eq!(criteria.budget_floor(), 500.0);
        assert_eq!(criteria.budget_ceiling(), 1000.0);
    }

    #[test]
    fn from_json_ignores_non_objects_and_mistyped_fields() {
        assert_eq!(GiftCriteria::from_json(&json!([])), GiftCriteria::default());
        assert_eq!(GiftCriteria::from_json(&json!("coffee")), GiftCriteria::default());

        let criteria = GiftCriteria::from_json(&json!({
            "recipient": 5,
            "occasion": "diwali",
            "interests": ["tea"],
            "budgetMin": null,
            "budgetMax": "1500",
            "note": "ignored"
        }));

        assert_eq!(criteria.recipient, None);
        assert_eq!(criteria.occasion(), Some("diwali"));
        assert_eq!(criteria.interests, None);
        assert_eq!(criteria.budget_min, None);
        assert_eq!(criteria.budget_ceiling(), 1500.0);
    }

    #[test]
    fn empty_strings_read_as_unset() {
        let criteria = GiftCriteria {
            recipient: Some(String::new()),
            occasion: Some(String::new()),
            ..GiftCriteria::default()
        };

        assert_eq!(criteria.recipient(), None);
        assert_eq!(criteria.occasion(), None);
    }

    #[test]
    fn serialization_omits_unset_fields() {
        let criteria =
            GiftCriteria { occasion: Some("birthday".to_string()), ..GiftCriteria::default() };

        let value = serde_json::to_value(&criteria).expect("criteria should serialize");
        assert_eq!(value, json!({ "occasion": "birthday" }));
    }
}
