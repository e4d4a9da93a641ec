use thiserror::Error;

/// Main error type for daily-recap
#[derive(Error, Debug)]
pub enum DailyRecapError {
    /// HTTP/API errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unrecognized AI provider id
    #[error("Unsupported AI provider: {0}")]
    UnsupportedProvider(String),

    /// AI generation request failure, carrying the provider's raw payload
    /// when one was returned
    #[error("AI generation failed: {detail}")]
    Generation {
        status: Option<u16>,
        detail: String,
    },

    /// Invalid date argument
    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    /// Generic error
    #[error("{0}")]
    #[allow(dead_code)]
    Other(String),
}

/// Result type alias for daily-recap operations
pub type Result<T> = std::result::Result<T, DailyRecapError>;

impl DailyRecapError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new generation error without an HTTP status
    pub fn generation<S: Into<String>>(msg: S) -> Self {
        Self::Generation {
            status: None,
            detail: msg.into(),
        }
    }

    /// Create a new generation error from an HTTP status and response body
    pub fn generation_http<S: Into<String>>(status: u16, body: S) -> Self {
        Self::Generation {
            status: Some(status),
            detail: format!("status {}: {}", status, body.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_display_with_status() {
        let err = DailyRecapError::generation_http(429, "quota exceeded");
        let msg = err.to_string();
        assert!(msg.contains("status 429"));
        assert!(msg.contains("quota exceeded"));
    }

    #[test]
    fn test_generation_error_display_without_status() {
        let err = DailyRecapError::generation("connection reset");
        let msg = err.to_string();
        assert!(!msg.contains("status"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn test_config_helper() {
        let err = DailyRecapError::config("GITLAB_URL is required");
        assert!(matches!(err, DailyRecapError::Config(_)));
    }
}
