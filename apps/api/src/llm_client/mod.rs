//! Anthropic Messages API client.
//!
//! Every model call in Folio goes through `LlmClient`; `assist` is its only caller.
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
pub const MODEL: &str = "claude-sonnet-4-5";
const ATTEMPTS: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Gave up after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Per-call generation limits.
#[derive(Debug, Clone, Copy)]
pub struct CallOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CallOptions {
    /// Whole-layout generation: a JSON array of up to eight sections.
    pub const LAYOUT: CallOptions = CallOptions {
        max_tokens: 2000,
        temperature: 0.7,
    };
    /// Single-section rewrite.
    pub const REWRITE: CallOptions = CallOptions {
        max_tokens: 600,
        temperature: 0.7,
    };
    /// Connection check; the reply itself is discarded.
    pub const PING: CallOptions = CallOptions {
        max_tokens: 1,
        temperature: 0.0,
    };
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [UserTurn<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserTurn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesReply {
    content: Vec<ReplyBlock>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ReplyBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct TokenUsage {
    input_tokens: u32,
    output_tokens: u32,
}

impl MessagesReply {
    fn into_text(self) -> Option<String> {
        self.content.into_iter().find_map(|block| match block {
            ReplyBlock::Text { text } => Some(text),
            ReplyBlock::Other => None,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Rate limits and server-side failures are worth another attempt.
fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Delay before retry `attempt` (1-based): 1s, 2s, 4s...
fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(1000 << attempt.saturating_sub(1).min(6))
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, api_key })
    }

    async fn send(
        &self,
        prompt: &str,
        system: &str,
        options: CallOptions,
        attempts: u32,
    ) -> Result<MessagesReply, LlmError> {
        let body = MessagesRequest {
            model: MODEL,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            system,
            messages: [UserTurn {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error = None;
        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = backoff(attempt);
                warn!("Retrying model call in {}ms (attempt {})", delay.as_millis(), attempt + 1);
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(MESSAGES_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", API_VERSION)
                .json(&body)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                let reply: MessagesReply = response.json().await?;
                if let Some(usage) = &reply.usage {
                    debug!(
                        "Model call ok: {} tokens in, {} out",
                        usage.input_tokens, usage.output_tokens
                    );
                }
                return Ok(reply);
            }

            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorReply>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            let error = LlmError::Api {
                status: status.as_u16(),
                message,
            };
            if !is_transient(status) {
                return Err(error);
            }
            warn!("Model API returned {status}");
            last_error = Some(error);
        }

        Err(last_error.unwrap_or(LlmError::Exhausted { attempts }))
    }

    /// The reply's first text block, trimmed and with any code fence removed.
    pub async fn call_text(
        &self,
        prompt: &str,
        system: &str,
        options: CallOptions,
    ) -> Result<String, LlmError> {
        let reply = self.send(prompt, system, options, ATTEMPTS).await?;
        let text = reply.into_text().ok_or(LlmError::EmptyContent)?;
        Ok(strip_json_fences(&text).to_string())
    }

    /// Like `call_text`, then parsed as JSON. The prompt must ask for JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
        options: CallOptions,
    ) -> Result<T, LlmError> {
        let text = self.call_text(prompt, system, options).await?;
        serde_json::from_str(&text).map_err(LlmError::Parse)
    }

    /// One-shot request that only checks the key and the API are reachable.
    pub async fn ping(&self) -> Result<(), LlmError> {
        self.send("ping", "Reply with OK.", CallOptions::PING, 1)
            .await
            .map(|_| ())
    }
}

/// Removes a surrounding ```json or ``` fence, if present.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let inner = inner.trim_start();
    inner.strip_suffix("```").map(str::trim).unwrap_or(inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n[{\"id\": \"a\"}]\n```";
        assert_eq!(strip_json_fences(input), "[{\"id\": \"a\"}]");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"content\": \"x\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"content\": \"x\"}");
    }

    #[test]
    fn test_strip_json_fences_unterminated() {
        assert_eq!(strip_json_fences("```json\n[1, 2]"), "[1, 2]");
        assert_eq!(strip_json_fences("  plain reply \n"), "plain reply");
    }

    #[test]
    fn test_reply_text_skips_non_text_blocks() {
        let reply: MessagesReply = serde_json::from_str(
            r#"{"content":[{"type":"thinking","thinking":"..."},{"type":"text","text":"hello"}],
                "usage":{"input_tokens":3,"output_tokens":1}}"#,
        )
        .unwrap();
        assert_eq!(reply.into_text().as_deref(), Some("hello"));

        let empty: MessagesReply = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert!(empty.into_text().is_none());
    }

    #[test]
    fn test_only_rate_limits_and_server_errors_retry() {
        assert!(is_transient(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient(StatusCode::BAD_GATEWAY));
        assert!(!is_transient(StatusCode::UNAUTHORIZED));
        assert!(!is_transient(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(backoff(1), Duration::from_secs(1));
        assert_eq!(backoff(2), Duration::from_secs(2));
        assert_eq!(backoff(3), Duration::from_secs(4));
    }

    #[test]
    fn test_call_options_budgets() {
        assert!(CallOptions::LAYOUT.max_tokens > CallOptions::REWRITE.max_tokens);
        assert!(CallOptions::PING.max_tokens < CallOptions::REWRITE.max_tokens);
    }
}
