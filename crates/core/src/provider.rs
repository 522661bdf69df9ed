use async_trait::async_trait;
use serde_json::Value;

use crate::error::{LectureError, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Provider {
    #[default]
    Gemini,
    Openai,
    Grok,
}

pub struct ProviderConfig {
    pub api_url: &'static str,
    pub model: &'static str,
    pub env_var: &'static str,
}

impl Provider {
    pub fn config(&self) -> ProviderConfig {
        match self {
            Provider::Gemini => ProviderConfig {
                api_url: "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions",
                model: "gemini-2.5-flash",
                env_var: "GOOGLE_API_KEY",
            },
            Provider::Openai => ProviderConfig {
                api_url: "https://api.openai.com/v1/chat/completions",
                model: "gpt-5.1",
                env_var: "OPENAI_API_KEY",
            },
            Provider::Grok => ProviderConfig {
                api_url: "https://api.x.ai/v1/chat/completions",
                model: "grok-4-fast",
                env_var: "XAI_API_KEY",
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini",
            Provider::Openai => "OpenAI",
            Provider::Grok => "Grok",
        }
    }

    /// Validate that the API key is set for this provider
    pub fn validate_api_key(&self) -> Result<String> {
        let config = self.config();
        match std::env::var(config.env_var) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(LectureError::MissingApiKey {
                env_var: config.env_var.to_string(),
            }),
        }
    }
}

/// Opaque text-completion service: one prompt in, the reply text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier sent with every call
    fn model(&self) -> &str;
}

/// OpenAI-compatible chat-completions client. Holds the API key read once at startup.
pub struct HttpTextGenerator {
    client: reqwest::Client,
    api_url: String,
    model: String,
    api_key: String,
}

impl HttpTextGenerator {
    /// Build a client for `provider`, failing if its API key variable is unset.
    pub fn from_env(provider: Provider) -> Result<Self> {
        let api_key = provider.validate_api_key()?;
        let config = provider.config();
        Ok(Self::new(config.api_url, config.model, api_key))
    }

    pub fn new(api_url: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    {
                        "role": "user",
                        "content": prompt,
                    },
                ],
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(LectureError::Service(upstream_error_message(status.as_u16(), &body)));
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            LectureError::Service(format!("Invalid API response: {}", e))
        })?;

        extract_completion_text(&value)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Pull the reply text out of a chat-completions body.
pub fn extract_completion_text(response: &Value) -> Result<String> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| LectureError::Service(format!("Invalid API response structure: {}", response)))
}

/// Best human-readable message for a non-2xx upstream reply.
pub fn upstream_error_message(status: u16, body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    // Gemini's compatibility layer sometimes wraps the error object in a one-element array
    let message = parsed.as_ref().and_then(|v| {
        v["error"]["message"]
            .as_str()
            .or_else(|| v[0]["error"]["message"].as_str())
            .map(str::to_string)
    });

    match message {
        Some(message) => format!("Upstream error ({}): {}", status, message),
        None if body.trim().is_empty() => format!("Upstream error ({})", status),
        None => format!("Upstream error ({}): {}", status, body.trim()),
    }
}
