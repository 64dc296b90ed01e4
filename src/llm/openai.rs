//! `OpenAI`-compatible chat completions provider (`DeepSeek` by default)

use super::types::{LlmMessage, LlmRequest, LlmResponse, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.deepseek.com/v1/chat/completions";

/// Transport-level ceiling on a single completion request
const TRANSPORT_TIMEOUT: Duration = Duration::from_secs(300);

/// Chat completions service for any endpoint speaking the `OpenAI` wire format
pub struct OpenAIService {
    client: Client,
    api_key: String,
    base_url: String,
    model_id: String,
}

impl OpenAIService {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(TRANSPORT_TIMEOUT)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model_id: model.into(),
        })
    }

    fn translate_request(&self, request: &LlmRequest) -> OpenAIRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(system) = request.system.as_deref().filter(|s| !s.is_empty()) {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: Some(system.to_string()),
            });
        }

        messages.extend(request.messages.iter().map(Self::translate_message));

        OpenAIRequest {
            model: self.model_id.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        }
    }

    fn translate_message(msg: &LlmMessage) -> OpenAIMessage {
        OpenAIMessage {
            role: msg.role.as_str().to_string(),
            content: Some(msg.content.clone()),
        }
    }

    fn normalize_response(resp: OpenAIResponse) -> Result<LlmResponse, LlmError> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::unknown("No choices in response"))?;

        let text = choice
            .message
            .content
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| LlmError::unknown("Response contained no message content"))?;

        let usage = resp.usage.map_or_else(Usage::default, |u| Usage {
            input_tokens: u64::from(u.prompt_tokens),
            output_tokens: u64::from(u.completion_tokens),
        });

        Ok(LlmResponse {
            text,
            finish_reason: choice.finish_reason,
            usage,
        })
    }
}

#[async_trait]
impl LlmService for OpenAIService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let openai_request = self.translate_request(request);

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<OpenAIErrorResponse>(&body)
                .map_or(body, |error_resp| error_resp.error.message);
            return Err(LlmError::from_status(status, &message));
        }

        let openai_response: OpenAIResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Self::normalize_response(openai_response)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> OpenAIService {
        OpenAIService::new("test-key", "deepseek-chat", DEFAULT_API_URL).unwrap()
    }

    #[test]
    fn test_translate_puts_system_first() {
        let request = LlmRequest {
            system: Some("You are an interviewer.".to_string()),
            messages: vec![
                LlmMessage::user("hi"),
                LlmMessage::assistant("hello"),
                LlmMessage::user("next"),
            ],
            max_tokens: Some(3000),
            temperature: Some(0.3),
        };

        let body = serde_json::to_value(service().translate_request(&request)).unwrap();

        assert_eq!(body["model"], "deepseek-chat");
        assert_eq!(body["max_tokens"], 3000);
        assert_eq!(body["stream"], false);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], json!({"role": "system", "content": "You are an interviewer."}));
        assert_eq!(messages[1], json!({"role": "user", "content": "hi"}));
        assert_eq!(messages[2], json!({"role": "assistant", "content": "hello"}));
        assert_eq!(messages[3]["content"], "next");
    }

    #[test]
    fn test_translate_omits_empty_system_and_unset_options() {
        let request = LlmRequest {
            system: Some(String::new()),
            messages: vec![LlmMessage::user("hi")],
            max_tokens: None,
            temperature: None,
        };

        let body = serde_json::to_value(service().translate_request(&request)).unwrap();

        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_normalize_reads_first_choice() {
        let resp: OpenAIResponse = serde_json::from_value(json!({
            "choices": [
                {"message": {"role": "assistant", "content": "Thanks. What next?"}, "finish_reason": "stop"},
                {"message": {"role": "assistant", "content": "ignored"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}
        }))
        .unwrap();

        let normalized = OpenAIService::normalize_response(resp).unwrap();
        assert_eq!(normalized.text, "Thanks. What next?");
        assert_eq!(normalized.finish_reason.as_deref(), Some("stop"));
        assert_eq!(normalized.usage.input_tokens, 12);
        assert_eq!(normalized.usage.output_tokens, 5);
    }

    #[test]
    fn test_normalize_rejects_empty_choices() {
        let resp: OpenAIResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        let err = OpenAIService::normalize_response(resp).unwrap_err();
        assert_eq!(err.kind, crate::llm::LlmErrorKind::Unknown);
    }

    #[test]
    fn test_normalize_rejects_blank_content() {
        let resp: OpenAIResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "   "}}]
        }))
        .unwrap();
        assert!(OpenAIService::normalize_response(resp).is_err());
    }
}
