use super::{Completion, CompletionClient};
use crate::model::Message;
use async_trait::async_trait;
use serde_json::json;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Chat-completions client for OpenAI-compatible gateways (OpenRouter by default).
pub struct OpenAiCompatClient {
    pub base_url: String,
    pub api_key: String,
    pub client: reqwest::Client,
}

impl OpenAiCompatClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatClient {
    async fn complete(&self, model: &str, messages: &[Message]) -> anyhow::Result<Completion> {
        // usage.include asks OpenRouter to report the charged cost.
        let body = json!({
            "model": model,
            "messages": messages,
            "usage": { "include": true },
        });

        let resp = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            anyhow::bail!("chat completions API error ({}): {}", status, error_text);
        }

        let json: serde_json::Value = resp.json().await?;
        parse_completion(&json)
    }

    fn provider_name(&self) -> &'static str {
        "openai-compat"
    }
}

/// Extracts text and cost from a chat-completions response body.
///
/// A null or missing `content` yields empty text so the session can record it as
/// a protocol error; a body without `choices` is a provider fault.
pub fn parse_completion(json: &serde_json::Value) -> anyhow::Result<Completion> {
    let message = json
        .pointer("/choices/0/message")
        .ok_or_else(|| anyhow::anyhow!("chat completions response missing choices"))?;

    let text = message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let cost = json
        .pointer("/usage/cost")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);

    Ok(Completion { text, cost })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completion_reads_text_and_cost() {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": "<guess>CRANE</guess>" } }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "cost": 0.0125 }
        });
        let c = parse_completion(&body).unwrap();
        assert_eq!(c.text, "<guess>CRANE</guess>");
        assert!((c.cost - 0.0125).abs() < 1e-12);
    }

    #[test]
    fn test_parse_completion_null_content_and_missing_cost() {
        let body = json!({ "choices": [{ "message": { "role": "assistant", "content": null } }] });
        let c = parse_completion(&body).unwrap();
        assert_eq!(c.text, "");
        assert_eq!(c.cost, 0.0);
    }

    #[test]
    fn test_parse_completion_without_choices_is_error() {
        let body = json!({ "error": { "message": "rate limited" } });
        assert!(parse_completion(&body).is_err());
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let c = OpenAiCompatClient::new("https://example.test/api/v1/", "k");
        assert_eq!(c.endpoint(), "https://example.test/api/v1/chat/completions");
    }
}
