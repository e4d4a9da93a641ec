use crate::ai::Provider;
use crate::error::{DailyRecapError, Result};
use std::env;

/// Application configuration, sourced from environment variables.
///
/// Every component receives this struct explicitly; nothing reads the
/// environment after startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GitLab instance base URL (e.g. https://gitlab.example.com)
    pub gitlab_url: String,

    /// GitLab personal access token
    pub gitlab_token: String,

    /// Project ids to collect commits from
    pub project_ids: Vec<String>,

    /// Username used for substring attribution when identity lookup degrades
    pub author_username: String,

    /// AI provider selection and credentials
    pub provider: ProviderConfig,

    /// DingTalk webhook URL (required unless running with --dry-run)
    pub dingtalk_webhook: Option<String>,

    /// DingTalk signing secret (optional)
    pub dingtalk_secret: Option<String>,

    /// Report author name shown in the markdown header
    pub report_author: String,

    /// Team label shown in the markdown header
    pub report_team: String,
}

/// AI provider configuration
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub api_key: String,
    pub api_url: String,
    /// Model override; each provider supplies a default when absent
    pub model: Option<String>,
}

impl Config {
    /// Build configuration from the process environment
    pub fn from_env() -> Result<Self> {
        let provider_id = required("AI_PROVIDER")?;
        let provider: Provider = provider_id.parse()?;

        let project_ids: Vec<String> = required("GITLAB_PROJECT_IDS")?
            .split(',')
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();

        let config = Self {
            gitlab_url: required("GITLAB_URL")?,
            gitlab_token: required("GITLAB_TOKEN")?,
            project_ids,
            author_username: required("GITLAB_AUTHOR_USERNAME")?,
            provider: ProviderConfig {
                provider,
                api_key: required("AI_API_KEY")?,
                api_url: required("AI_API_URL")?,
                model: optional("AI_MODEL"),
            },
            dingtalk_webhook: optional("DINGTALK_WEBHOOK"),
            dingtalk_secret: optional("DINGTALK_SECRET"),
            report_author: optional("REPORT_AUTHOR").unwrap_or_default(),
            report_team: optional("REPORT_TEAM").unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.gitlab_url.is_empty() {
            return Err(DailyRecapError::config("GITLAB_URL must not be empty"));
        }

        if self.gitlab_url.ends_with('/') {
            return Err(DailyRecapError::config(
                "GITLAB_URL must not end with a trailing slash",
            ));
        }

        if self.project_ids.is_empty() {
            return Err(DailyRecapError::config(
                "GITLAB_PROJECT_IDS must contain at least one project id",
            ));
        }

        if self.author_username.is_empty() {
            return Err(DailyRecapError::config(
                "GITLAB_AUTHOR_USERNAME must not be empty",
            ));
        }

        if self.provider.api_url.is_empty() {
            return Err(DailyRecapError::config("AI_API_URL must not be empty"));
        }

        Ok(())
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key)
        .map_err(|_| DailyRecapError::config(format!("missing required environment variable {}", key)))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}
