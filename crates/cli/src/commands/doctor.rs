use giftwise_core::config::{AppConfig, LlmProvider, LoadOptions};
use giftwise_core::CatalogSource;
use giftwise_storefront::StorefrontClient;
use serde::Serialize;

use super::{escape_json, CommandResult, EXIT_CONFIG_FAILURE, EXIT_FAILURE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let (report, exit_code) = build_report();

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> (DoctorReport, u8) {
    let mut checks = Vec::new();

    let exit_code = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_ranker(&config));
            checks.push(check_catalog_connectivity(&config));
            EXIT_FAILURE
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["ai_ranker", "catalog_connectivity"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
            EXIT_CONFIG_FAILURE
        }
    };

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    let report = DoctorReport { overall_status, summary, checks };
    (report, if all_pass { 0 } else { exit_code })
}

fn check_ranker(config: &AppConfig) -> DoctorCheck {
    let details = match config.llm.provider {
        LlmProvider::Disabled => "ai ranking disabled; requests use the fallback ranker".to_string(),
        provider if !config.llm.ai_ranking_available() => format!(
            "{} selected but llm.api_key is not set; requests use the fallback ranker",
            provider.as_str()
        ),
        provider => format!(
            "{} model `{}` at {}",
            provider.as_str(),
            config.llm.model,
            config.llm.effective_base_url().unwrap_or("<unset>")
        ),
    };
    DoctorCheck { name: "ai_ranker", status: CheckStatus::Pass, details }
}

fn check_catalog_connectivity(config: &AppConfig) -> DoctorCheck {
    let client = match StorefrontClient::from_config(&config.storefront) {
        Ok(client) => client,
        Err(error) => {
            return DoctorCheck {
                name: "catalog_connectivity",
                status: CheckStatus::Fail,
                details: error.to_string(),
            };
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "catalog_connectivity",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let limit = config.storefront.product_limit as usize;
    match runtime.block_on(client.fetch_products(limit)) {
        Ok(products) => DoctorCheck {
            name: "catalog_connectivity",
            status: CheckStatus::Pass,
            details: format!("fetched {} products from `{}`", products.len(), client.endpoint()),
        },
        Err(error) => DoctorCheck {
            name: "catalog_connectivity",
            status: CheckStatus::Fail,
            details: format!("{error} (`{}`)", client.endpoint()),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
