//! Provider capability sets.
//!
//! Every backend implements the same small contract: pick a default model,
//! build a wire request from provider-agnostic messages, and pull the
//! generated text out of the wire response. Adding a provider means
//! registering one new implementation here; call sites never branch on the
//! provider id.

use serde_json::{json, Value};

use crate::ai::{GenerationMessage, Provider};
use crate::error::{DailyRecapError, Result};

/// Common operation contract for a text-generation backend
pub trait ProviderSpec: Send + Sync {
    /// Model used when the configuration carries no override
    fn default_model(&self) -> &'static str;

    /// Build the provider-specific request body
    fn build_request(&self, model: &str, messages: &[GenerationMessage]) -> Value;

    /// Extract the generated text from the provider's response body
    fn extract_content(&self, body: &Value) -> Result<String>;
}

/// OpenAI-style chat completions; also covers the vendors that expose a
/// compatible surface (zhipu, deepseek) under their own default model.
struct OpenAiCompatible {
    default_model: &'static str,
}

impl ProviderSpec for OpenAiCompatible {
    fn default_model(&self) -> &'static str {
        self.default_model
    }

    fn build_request(&self, model: &str, messages: &[GenerationMessage]) -> Value {
        json!({
            "model": model,
            "messages": messages,
            "temperature": 0.7,
            "max_tokens": 500,
        })
    }

    fn extract_content(&self, body: &Value) -> Result<String> {
        body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                DailyRecapError::generation(format!(
                    "missing choices[0].message.content in response: {}",
                    body
                ))
            })
    }
}

/// Qianwen envelope: messages nested under `input`, no sampling knobs,
/// content at `output.text`.
struct QianwenEnvelope;

impl ProviderSpec for QianwenEnvelope {
    fn default_model(&self) -> &'static str {
        "qwen-turbo"
    }

    fn build_request(&self, model: &str, messages: &[GenerationMessage]) -> Value {
        json!({
            "model": model,
            "input": { "messages": messages },
        })
    }

    fn extract_content(&self, body: &Value) -> Result<String> {
        body["output"]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                DailyRecapError::generation(format!(
                    "missing output.text in response: {}",
                    body
                ))
            })
    }
}

static OPENAI: OpenAiCompatible = OpenAiCompatible {
    default_model: "gpt-3.5-turbo",
};
static ZHIPU: OpenAiCompatible = OpenAiCompatible {
    default_model: "glm-4",
};
static DEEPSEEK: OpenAiCompatible = OpenAiCompatible {
    default_model: "deepseek-chat",
};
static QIANWEN: QianwenEnvelope = QianwenEnvelope;

/// Capability set for a recognized provider
pub fn capability(provider: Provider) -> &'static dyn ProviderSpec {
    match provider {
        Provider::OpenAi => &OPENAI,
        Provider::Zhipu => &ZHIPU,
        Provider::DeepSeek => &DEEPSEEK,
        Provider::Qianwen => &QIANWEN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages() -> Vec<GenerationMessage> {
        vec![
            GenerationMessage::system("你是日报助手"),
            GenerationMessage::user("提交记录"),
        ]
    }

    #[test]
    fn test_default_models() {
        assert_eq!(capability(Provider::OpenAi).default_model(), "gpt-3.5-turbo");
        assert_eq!(capability(Provider::Qianwen).default_model(), "qwen-turbo");
        assert_eq!(capability(Provider::Zhipu).default_model(), "glm-4");
        assert_eq!(
            capability(Provider::DeepSeek).default_model(),
            "deepseek-chat"
        );
    }

    #[test]
    fn test_openai_request_shape() {
        let spec = capability(Provider::OpenAi);
        let body = spec.build_request("gpt-3.5-turbo", &messages());

        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
    }

    #[test]
    fn test_qianwen_request_shape() {
        let spec = capability(Provider::Qianwen);
        let body = spec.build_request("qwen-turbo", &messages());

        assert_eq!(body["model"], "qwen-turbo");
        assert_eq!(body["input"]["messages"][1]["content"], "提交记录");
        assert!(body.get("temperature").is_none());
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("messages").is_none());
    }

    #[test]
    fn test_openai_extract_content() {
        let spec = capability(Provider::OpenAi);
        let body = json!({"choices": [{"message": {"content": "X"}}]});
        assert_eq!(spec.extract_content(&body).unwrap(), "X");
    }

    #[test]
    fn test_qianwen_extract_content() {
        let spec = capability(Provider::Qianwen);
        let body = json!({"output": {"text": "日报内容"}});
        assert_eq!(spec.extract_content(&body).unwrap(), "日报内容");
    }

    #[test]
    fn test_extract_content_shape_mismatch() {
        let spec = capability(Provider::OpenAi);
        let body = json!({"output": {"text": "wrong shape"}});
        assert!(spec.extract_content(&body).is_err());
    }
}
