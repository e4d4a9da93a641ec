pub mod client;
pub mod provider;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::DailyRecapError;

pub use client::GenerationClient;

/// Message role in a generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// Provider-agnostic chat message
#[derive(Debug, Clone, Serialize)]
pub struct GenerationMessage {
    pub role: Role,
    pub content: String,
}

impl GenerationMessage {
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Recognized text-generation providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Qianwen,
    Zhipu,
    DeepSeek,
}

impl FromStr for Provider {
    type Err = DailyRecapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Self::OpenAi),
            "qianwen" => Ok(Self::Qianwen),
            "zhipu" => Ok(Self::Zhipu),
            "deepseek" => Ok(Self::DeepSeek),
            other => Err(DailyRecapError::UnsupportedProvider(other.to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            Self::OpenAi => "openai",
            Self::Qianwen => "qianwen",
            Self::Zhipu => "zhipu",
            Self::DeepSeek => "deepseek",
        };
        write!(f, "{}", id)
    }
}
