use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::finder::GiftFinderSettings;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storefront: StorefrontConfig,
    pub llm: LlmConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct StorefrontConfig {
    pub domain: String,
    pub access_token: SecretString,
    pub api_version: String,
    pub product_limit: u32,
    pub timeout_secs: u64,
    pub default_currency: String,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub force_json: bool,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    #[serde(rename = "openai")]
    OpenAi,
    Ollama,
    Disabled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub storefront_domain: Option<String>,
    pub storefront_access_token: Option<String>,
    pub llm_provider: Option<LlmProvider>,
    pub llm_api_key: Option<String>,
    pub llm_model: Option<String>,
    pub server_port: Option<u16>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storefront: StorefrontConfig {
                domain: String::new(),
                access_token: String::new().into(),
                api_version: "2024-04".to_string(),
                product_limit: 30,
                timeout_secs: 15,
                default_currency: "INR".to_string(),
            },
            llm: LlmConfig {
                provider: LlmProvider::OpenAi,
                api_key: None,
                base_url: None,
                model: "gpt-4o-mini".to_string(),
                temperature: 0.2,
                timeout_secs: 20,
                force_json: true,
            },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 3000 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            "disabled" | "none" => Ok(Self::Disabled),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected openai|ollama|disabled)"
            ))),
        }
    }
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
            Self::Disabled => "disabled",
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl LlmConfig {
    /// Base URL for the chat completions API; OpenAI has a built-in default.
    pub fn effective_base_url(&self) -> Option<&str> {
        match (self.base_url.as_deref(), self.provider) {
            (Some(url), _) => Some(url),
            (None, LlmProvider::OpenAi) => Some(OPENAI_BASE_URL),
            (None, _) => None,
        }
    }

    /// OpenAI needs an api key; without one requests rank locally.
    pub fn ai_ranking_available(&self) -> bool {
        match self.provider {
            LlmProvider::Disabled => false,
            LlmProvider::OpenAi => self
                .api_key
                .as_ref()
                .is_some_and(|value| !value.expose_secret().trim().is_empty()),
            LlmProvider::Ollama => true,
        }
    }
}

impl StorefrontConfig {
    /// CORS origin allowed to call the gift finder.
    pub fn allowed_origin(&self) -> String {
        format!("https://{}", self.domain)
    }

    pub fn graphql_endpoint(&self) -> String {
        format!("https://{}/api/{}/graphql.json", self.domain, self.api_version)
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("giftwise.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn finder_settings(&self) -> GiftFinderSettings {
        GiftFinderSettings {
            storefront_domain: self.storefront.domain.clone(),
            product_limit: self.storefront.product_limit as usize,
        }
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(storefront) = patch.storefront {
            if let Some(domain) = storefront.domain {
                self.storefront.domain = domain;
            }
            if let Some(access_token) = storefront.access_token {
                self.storefront.access_token = secret_value(access_token);
            }
            if let Some(api_version) = storefront.api_version {
                self.storefront.api_version = api_version;
            }
            if let Some(product_limit) = storefront.product_limit {
                self.storefront.product_limit = product_limit;
            }
            if let Some(timeout_secs) = storefront.timeout_secs {
                self.storefront.timeout_secs = timeout_secs;
            }
            if let Some(default_currency) = storefront.default_currency {
                self.storefront.default_currency = default_currency;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(api_key) = llm.api_key {
                self.llm.api_key = Some(secret_value(api_key));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = Some(base_url);
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(temperature) = llm.temperature {
                self.llm.temperature = temperature;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
            if let Some(force_json) = llm.force_json {
                self.llm.force_json = force_json;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let domain =
            read_env("GIFTWISE_STOREFRONT_DOMAIN").or_else(|| read_env("SHOPIFY_STOREFRONT_DOMAIN"));
        if let Some(value) = domain {
            self.storefront.domain = value;
        }
        let access_token = read_env("GIFTWISE_STOREFRONT_ACCESS_TOKEN")
            .or_else(|| read_env("SHOPIFY_STOREFRONT_TOKEN"));
        if let Some(value) = access_token {
            self.storefront.access_token = secret_value(value);
        }
        if let Some(value) = read_env("GIFTWISE_STOREFRONT_API_VERSION") {
            self.storefront.api_version = value;
        }
        if let Some(value) = read_env("GIFTWISE_STOREFRONT_PRODUCT_LIMIT") {
            self.storefront.product_limit = parse_u32("GIFTWISE_STOREFRONT_PRODUCT_LIMIT", &value)?;
        }
        if let Some(value) = read_env("GIFTWISE_STOREFRONT_TIMEOUT_SECS") {
            self.storefront.timeout_secs = parse_u64("GIFTWISE_STOREFRONT_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("GIFTWISE_STOREFRONT_DEFAULT_CURRENCY") {
            self.storefront.default_currency = value;
        }

        if let Some(value) = read_env("GIFTWISE_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        let api_key = read_env("GIFTWISE_LLM_API_KEY").or_else(|| read_env("OPENAI_API_KEY"));
        if let Some(value) = api_key {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("GIFTWISE_LLM_BASE_URL") {
            self.llm.base_url = Some(value);
        }
        if let Some(value) = read_env("GIFTWISE_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("GIFTWISE_LLM_TEMPERATURE") {
            self.llm.temperature = parse_f32("GIFTWISE_LLM_TEMPERATURE", &value)?;
        }
        if let Some(value) = read_env("GIFTWISE_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("GIFTWISE_LLM_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("GIFTWISE_LLM_FORCE_JSON") {
            self.llm.force_json = parse_bool("GIFTWISE_LLM_FORCE_JSON", &value)?;
        }

        if let Some(value) = read_env("GIFTWISE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("GIFTWISE_SERVER_PORT") {
            self.server.port = parse_u16("GIFTWISE_SERVER_PORT", &value)?;
        }

        let log_level =
            read_env("GIFTWISE_LOGGING_LEVEL").or_else(|| read_env("GIFTWISE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("GIFTWISE_LOGGING_FORMAT").or_else(|| read_env("GIFTWISE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(domain) = overrides.storefront_domain {
            self.storefront.domain = domain;
        }
        if let Some(access_token) = overrides.storefront_access_token {
            self.storefront.access_token = secret_value(access_token);
        }
        if let Some(provider) = overrides.llm_provider {
            self.llm.provider = provider;
        }
        if let Some(api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(api_key));
        }
        if let Some(model) = overrides.llm_model {
            self.llm.model = model;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_storefront(&self.storefront)?;
        validate_llm(&self.llm)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Explicit path if it exists, else the first of `giftwise.toml` and
/// `config/giftwise.toml` found in the working directory.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("giftwise.toml"), PathBuf::from("config/giftwise.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_storefront(storefront: &StorefrontConfig) -> Result<(), ConfigError> {
    let domain = storefront.domain.trim();
    if domain.is_empty() {
        return Err(ConfigError::Validation(
            "storefront.domain is required (e.g. `your-store.myshopify.com`)".to_string(),
        ));
    }
    if domain.contains("://") || domain.contains('/') || domain.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(
            "storefront.domain must be a bare host name without scheme or path".to_string(),
        ));
    }

    if storefront.access_token.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "storefront.access_token is required. Create one under Shopify admin > Apps > Headless > Storefront API".to_string(),
        ));
    }

    if storefront.api_version.trim().is_empty() {
        return Err(ConfigError::Validation("storefront.api_version must not be empty".to_string()));
    }

    if storefront.product_limit == 0 || storefront.product_limit > 250 {
        return Err(ConfigError::Validation(
            "storefront.product_limit must be in range 1..=250".to_string(),
        ));
    }

    if storefront.timeout_secs == 0 || storefront.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "storefront.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if !(0.0..=2.0).contains(&llm.temperature) {
        return Err(ConfigError::Validation(
            "llm.temperature must be in range 0.0..=2.0".to_string(),
        ));
    }

    match llm.provider {
        LlmProvider::Ollama => {
            let missing =
                llm.base_url.as_ref().map(|value| value.trim().is_empty()).unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.base_url is required for ollama provider".to_string(),
                ));
            }
        }
        LlmProvider::OpenAi | LlmProvider::Disabled => {}
    }

    if let Some(base_url) = &llm.base_url {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "llm.base_url must start with http:// or https://".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f32(key: &str, value: &str) -> Result<f32, ConfigError> {
    value.parse::<f32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    storefront: Option<StorefrontPatch>,
    llm: Option<LlmPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct StorefrontPatch {
    domain: Option<String>,
    access_token: Option<String>,
    api_version: Option<String>,
    product_limit: Option<u32>,
    timeout_secs: Option<u64>,
    default_currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    timeout_secs: Option<u64>,
    force_json: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
