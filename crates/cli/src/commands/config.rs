use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use giftwise_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

use super::CommandResult;

struct ConfigFile {
    path: PathBuf,
    doc: Option<Value>,
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return CommandResult::config_failure("config", error.to_string()),
    };

    let file = resolve_config_path(None)
        .map(|path| ConfigFile { doc: load_config_file_doc(&path), path });

    CommandResult { exit_code: 0, output: render(&config, file.as_ref()) }
}

fn render(config: &AppConfig, file: Option<&ConfigFile>) -> String {
    let storefront = &config.storefront;
    let llm = &config.llm;
    let line = |key: &str, value: &str, env_keys: &[&str]| {
        render_line(key, value, field_source(key, env_keys, file))
    };

    let access_token = redact_token(storefront.access_token.expose_secret());
    let api_key = llm
        .api_key
        .as_ref()
        .map(|key| redact_token(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());

    [
        "effective config (source precedence: env > file > default):".to_string(),
        line(
            "storefront.domain",
            &storefront.domain,
            &["GIFTWISE_STOREFRONT_DOMAIN", "SHOPIFY_STOREFRONT_DOMAIN"],
        ),
        line(
            "storefront.access_token",
            &access_token,
            &["GIFTWISE_STOREFRONT_ACCESS_TOKEN", "SHOPIFY_STOREFRONT_TOKEN"],
        ),
        line("storefront.api_version", &storefront.api_version, &["GIFTWISE_STOREFRONT_API_VERSION"]),
        line(
            "storefront.product_limit",
            &storefront.product_limit.to_string(),
            &["GIFTWISE_STOREFRONT_PRODUCT_LIMIT"],
        ),
        line(
            "storefront.timeout_secs",
            &storefront.timeout_secs.to_string(),
            &["GIFTWISE_STOREFRONT_TIMEOUT_SECS"],
        ),
        line(
            "storefront.default_currency",
            &storefront.default_currency,
            &["GIFTWISE_STOREFRONT_DEFAULT_CURRENCY"],
        ),
        line("llm.provider", llm.provider.as_str(), &["GIFTWISE_LLM_PROVIDER"]),
        line("llm.api_key", &api_key, &["GIFTWISE_LLM_API_KEY", "OPENAI_API_KEY"]),
        line("llm.base_url", llm.effective_base_url().unwrap_or("<unset>"), &["GIFTWISE_LLM_BASE_URL"]),
        line("llm.model", &llm.model, &["GIFTWISE_LLM_MODEL"]),
        line("llm.temperature", &llm.temperature.to_string(), &["GIFTWISE_LLM_TEMPERATURE"]),
        line("llm.timeout_secs", &llm.timeout_secs.to_string(), &["GIFTWISE_LLM_TIMEOUT_SECS"]),
        line("llm.force_json", &llm.force_json.to_string(), &["GIFTWISE_LLM_FORCE_JSON"]),
        line("server.bind_address", &config.server.bind_address, &["GIFTWISE_SERVER_BIND_ADDRESS"]),
        line("server.port", &config.server.port.to_string(), &["GIFTWISE_SERVER_PORT"]),
        line(
            "logging.level",
            &config.logging.level,
            &["GIFTWISE_LOGGING_LEVEL", "GIFTWISE_LOG_LEVEL"],
        ),
        line(
            "logging.format",
            &format!("{:?}", config.logging.format).to_lowercase(),
            &["GIFTWISE_LOGGING_FORMAT", "GIFTWISE_LOG_FORMAT"],
        ),
    ]
    .join("\n")
}

fn load_config_file_doc(path: &Path) -> Option<Value> {
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(key_path: &str, env_keys: &[&str], file: Option<&ConfigFile>) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(file) = file {
        if file.doc.as_ref().is_some_and(|doc| contains_path(doc, key_path)) {
            return format!("file ({})", file.path.display());
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps a recognisable prefix (`sk-`, `shpat_`) and hides the rest.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    match trimmed.find(['-', '_']) {
        Some(index) if index > 0 => format!("{}***", &trimmed[..=index]),
        _ => "<redacted>".to_string(),
    }
}
