use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::ai::provider::capability;
use crate::ai::GenerationMessage;
use crate::config::ProviderConfig;
use crate::error::{DailyRecapError, Result};

const SYSTEM_PROMPT: &str =
    "你是一个专业的技术日报助手,擅长将代码提交记录转化为简洁的工作日报。";

/// Client for the configured text-generation provider
pub struct GenerationClient {
    client: Client,
}

impl GenerationClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self { client })
    }

    /// Generate the report text for a prompt.
    ///
    /// One bearer-authenticated POST, no retries; HTTP and shape errors
    /// propagate as a single generation failure.
    pub async fn generate(&self, prompt: &str, config: &ProviderConfig) -> Result<String> {
        let spec = capability(config.provider);
        let model = config
            .model
            .as_deref()
            .unwrap_or_else(|| spec.default_model());

        let messages = vec![
            GenerationMessage::system(SYSTEM_PROMPT),
            GenerationMessage::user(prompt),
        ];
        let request_body = spec.build_request(model, &messages);

        let response = self
            .client
            .post(&config.api_url)
            .bearer_auth(&config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| DailyRecapError::generation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no response body>".to_string());
            return Err(DailyRecapError::generation_http(status.as_u16(), body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DailyRecapError::generation(e.to_string()))?;

        spec.extract_content(&body)
    }
}
