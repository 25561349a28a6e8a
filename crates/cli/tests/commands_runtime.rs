use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use giftwise_cli::commands::rank::{self, RankArgs};
use giftwise_cli::commands::{config, doctor};
use serde_json::{json, Value};

#[test]
fn config_returns_validation_failure_without_storefront_env() {
    with_env(&[], || {
        let result = config::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn config_attributes_env_sources_and_redacts_secrets() {
    with_env(
        &[
            ("SHOPIFY_STOREFRONT_DOMAIN", "gifts.example.com"),
            ("SHOPIFY_STOREFRONT_TOKEN", "shpat_secretvalue"),
            ("OPENAI_API_KEY", "sk-secretvalue"),
            ("GIFTWISE_SERVER_PORT", "8080"),
        ],
        || {
            let result = config::run();
            assert_eq!(result.exit_code, 0, "expected config to load from env");

            let output = &result.output;
            assert!(output.contains(
                "- storefront.domain = gifts.example.com (source: env (SHOPIFY_STOREFRONT_DOMAIN))"
            ));
            assert!(output.contains(
                "- storefront.access_token = shpat_*** (source: env (SHOPIFY_STOREFRONT_TOKEN))"
            ));
            assert!(output.contains("- llm.api_key = sk-*** (source: env (OPENAI_API_KEY))"));
            assert!(output.contains("- server.port = 8080 (source: env (GIFTWISE_SERVER_PORT))"));
            assert!(output.contains("- llm.model = gpt-4o-mini (source: default)"));
            assert!(!output.contains("secretvalue"), "secrets must not be printed");
        },
    );
}

#[test]
fn doctor_reports_config_failure_and_skips_remaining_checks() {
    with_env(&[], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][0]["name"], "config_validation");
        assert_eq!(payload["checks"][0]["status"], "fail");
        assert_eq!(payload["checks"][1]["status"], "skipped");
        assert_eq!(payload["checks"][2]["name"], "catalog_connectivity");
        assert_eq!(payload["checks"][2]["status"], "skipped");
    });
}

#[test]
fn rank_orders_local_catalog_with_fallback_ranker() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let catalog = write_catalog(
        &dir,
        json!([
            { "handle": "golf-balls", "title": "Golf Balls", "tags": ["golf", "dad"], "price": 1800 },
            { "handle": "coffee-mug", "title": "Coffee Mug", "tags": ["coffee"], "price": 450 },
            { "handle": "desk-lamp", "title": "Desk Lamp", "type": "Home", "price": 2200 },
            { "handle": "putter", "title": "Putter", "tags": ["golf"], "price": 9000 }
        ]),
    );

    let result = rank::run(&RankArgs {
        catalog,
        interests: Some("golf".to_string()),
        recipient: Some("dad".to_string()),
        occasion: None,
        budget_min: None,
        budget_max: Some("2500".to_string()),
    });
    assert_eq!(result.exit_code, 0, "expected rank to succeed");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "rank");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["candidate_count"], 4);
    let handles: Vec<&str> = payload["recommendations"]
        .as_array()
        .expect("recommendations should be an array")
        .iter()
        .filter_map(|rec| rec["handle"].as_str())
        .collect();
    assert_eq!(handles, vec!["golf-balls", "coffee-mug", "desk-lamp"]);
    assert_eq!(payload["recommendations"][0]["score"], 4.0);
    assert_eq!(payload["recommendations"][0]["reason"], "Matched your interests/budget");
}

#[test]
fn rank_is_deterministic_across_runs() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let catalog = write_catalog(
        &dir,
        json!([
            { "handle": "a", "title": "Tea Set", "price": 700 },
            { "handle": "b", "title": "Tea Tin", "price": 700 },
            { "handle": "c", "title": "Tea Cup", "price": 300 }
        ]),
    );
    let args = RankArgs {
        catalog,
        interests: Some("tea".to_string()),
        recipient: None,
        occasion: None,
        budget_min: None,
        budget_max: None,
    };

    let first = rank::run(&args);
    let second = rank::run(&args);

    assert_eq!(first.exit_code, 0);
    assert_eq!(first.output, second.output);
}

#[test]
fn rank_fails_when_catalog_file_is_missing() {
    let dir = tempfile::tempdir().expect("tempdir should be created");

    let result = rank::run(&RankArgs {
        catalog: dir.path().join("missing.json"),
        interests: None,
        recipient: None,
        occasion: None,
        budget_min: None,
        budget_max: None,
    });

    assert_eq!(result.exit_code, 1);
    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "catalog_read");
}

#[test]
fn rank_fails_when_catalog_is_not_a_product_array() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let catalog = write_catalog(&dir, json!({ "products": [] }));

    let result = rank::run(&RankArgs {
        catalog,
        interests: None,
        recipient: None,
        occasion: None,
        budget_min: None,
        budget_max: None,
    });

    assert_eq!(result.exit_code, 1);
    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "catalog_parse");
}

fn write_catalog(dir: &tempfile::TempDir, products: Value) -> PathBuf {
    let path = dir.path().join("catalog.json");
    fs::write(&path, products.to_string()).expect("catalog fixture should be written");
    path
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "GIFTWISE_STOREFRONT_DOMAIN",
        "GIFTWISE_STOREFRONT_ACCESS_TOKEN",
        "GIFTWISE_STOREFRONT_API_VERSION",
        "GIFTWISE_STOREFRONT_PRODUCT_LIMIT",
        "GIFTWISE_STOREFRONT_TIMEOUT_SECS",
        "GIFTWISE_STOREFRONT_DEFAULT_CURRENCY",
        "SHOPIFY_STOREFRONT_DOMAIN",
        "SHOPIFY_STOREFRONT_TOKEN",
        "GIFTWISE_LLM_PROVIDER",
        "GIFTWISE_LLM_API_KEY",
        "OPENAI_API_KEY",
        "GIFTWISE_LLM_BASE_URL",
        "GIFTWISE_LLM_MODEL",
        "GIFTWISE_LLM_TEMPERATURE",
        "GIFTWISE_LLM_TIMEOUT_SECS",
        "GIFTWISE_LLM_FORCE_JSON",
        "GIFTWISE_SERVER_BIND_ADDRESS",
        "GIFTWISE_SERVER_PORT",
        "GIFTWISE_LOGGING_LEVEL",
        "GIFTWISE_LOGGING_FORMAT",
        "GIFTWISE_LOG_LEVEL",
        "GIFTWISE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
