use std::time::Duration;

use scrag_core::config::{OracleConfig, ENV_API_KEY};
use scrag_core::error::AppError;
use serde::{Deserialize, Serialize};

use super::Llm;

/// Client for an OpenAI-compatible `/chat/completions` endpoint. Groq is the default host.
#[derive(Clone)]
pub struct GroqLlm {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl std::fmt::Debug for GroqLlm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqLlm")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GroqLlm {
    /// Fails when no API key is configured; nothing can be answered without one.
    pub fn new(cfg: &OracleConfig) -> Result<Self, AppError> {
        let api_key = cfg
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AppError::new(
                    "CONFIG_MISSING_CREDENTIALS",
                    "Oracle API key is not configured",
                )
                .with_details(format!("set {ENV_API_KEY} or oracle.api_key"))
            })?;

        let base_url = cfg.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(AppError::new(
                "CONFIG_INVALID",
                "Oracle base URL must be an http(s) URL",
            )
            .with_details(format!("base_url={base_url}")));
        }

        Ok(Self {
            base_url,
            api_key: api_key.to_string(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            timeout: Duration::from_secs(cfg.timeout_secs),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// First choice's content. An empty completion is returned as-is; callers decide what it
/// is worth.
fn completion_text(resp: ChatResponse) -> String {
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default()
}

impl Llm for GroqLlm {
    fn invoke(&self, prompt: &str) -> Result<String, AppError> {
        let url = format!("{}/chat/completions", self.base_url);
        let req = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let resp = ureq::post(&url)
            .timeout(self.timeout)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(serde_json::to_value(req).map_err(|e| {
                AppError::new("AI_ORACLE_FAILED", "Failed to encode chat request")
                    .with_details(e.to_string())
            })?);

        match resp {
            Ok(r) => {
                let v: ChatResponse = r.into_json().map_err(|e| {
                    AppError::new("AI_ORACLE_FAILED", "Failed to decode chat response")
                        .with_details(e.to_string())
                })?;
                Ok(completion_text(v))
            }
            Err(ureq::Error::Status(code, _)) => Err(
                AppError::new("AI_ORACLE_FAILED", "Chat completion request failed")
                    .with_details(format!("status={code}"))
                    .with_retryable(code == 429 || code >= 500),
            ),
            Err(e) => Err(
                AppError::new("AI_ORACLE_UNREACHABLE", "Failed to call chat completions endpoint")
                    .with_details(e.to_string())
                    .with_retryable(true),
            ),
        }
    }
}
