use crate::cli::{GlobalArgs, PlanArgs};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("API base URL is empty")]
    EmptyBaseUrl,
    #[error("API base URL must start with http:// or https:// (got `{0}`)")]
    UnsupportedScheme(String),
}

/// Resolved settings shared by the TUI and the one-shot commands. The plan
/// fields stay as typed; they are parsed when a plan request is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub language: String,
    pub country: String,
    pub horizon_days: String,
    pub permanent_service_ids: String,
}

impl Config {
    pub fn from_cli(global: &GlobalArgs, plan: &PlanArgs) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: normalize_base_url(&global.api_base_url)?,
            language: global.language.trim().to_string(),
            country: global.country.clone(),
            horizon_days: plan.horizon.clone(),
            permanent_service_ids: plan.permanent.clone(),
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyBaseUrl);
    }
    let lower = trimmed.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err(ConfigError::UnsupportedScheme(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}
