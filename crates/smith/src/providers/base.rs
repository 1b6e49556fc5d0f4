use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::SmithResult;
use crate::models::message::Message;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// Hint asking the remote model for a particular response format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    JsonObject,
}

/// Sampling parameters forwarded with a request, unset values use the provider default
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
}

impl SamplingParams {
    /// Values set on `other` take precedence over the ones in `self`
    pub fn merged_with(self, other: SamplingParams) -> SamplingParams {
        SamplingParams {
            temperature: other.temperature.or(self.temperature),
            top_p: other.top_p.or(self.top_p),
            max_tokens: other.max_tokens.or(self.max_tokens),
        }
    }
}

/// A single chat-completion call, built fresh for every call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(flatten)]
    pub sampling: SamplingParams,
    #[serde(default)]
    pub response_format: Option<ResponseFormat>,
}

impl GenerationRequest {
    pub fn new<S: Into<String>>(model: S, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            sampling: SamplingParams::default(),
            response_format: None,
        }
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn wants_structured(&self) -> bool {
        self.response_format == Some(ResponseFormat::JsonObject)
    }
}

/// Normalized output of any provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum GenerationResult {
    Text(String),
    Structured(Value),
}

impl GenerationResult {
    /// Build a result from raw model output, parsing it when a structured response was requested
    pub fn from_content(content: String, structured: bool) -> Self {
        if structured {
            match serde_json::from_str::<Value>(&content) {
                Ok(value) => GenerationResult::Structured(value),
                Err(_) => GenerationResult::Text(content),
            }
        } else {
            GenerationResult::Text(content)
        }
    }

    pub fn into_text(self) -> String {
        match self {
            GenerationResult::Text(text) => text,
            GenerationResult::Structured(value) => value.to_string(),
        }
    }

    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            GenerationResult::Structured(value) => Some(value),
            GenerationResult::Text(_) => None,
        }
    }
}

/// Base trait for chat-completion providers (OpenAI, Anthropic, etc)
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Model used when a caller does not pick one
    fn default_model(&self) -> &str;

    /// Send one request and normalize the response
    async fn complete(&self, request: &GenerationRequest)
        -> SmithResult<(GenerationResult, Usage)>;
}

#[async_trait]
impl<P: Provider + ?Sized> Provider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn default_model(&self) -> &str {
        (**self).default_model()
    }

    async fn complete(
        &self,
        request: &GenerationRequest,
    ) -> SmithResult<(GenerationResult, Usage)> {
        (**self).complete(request).await
    }
}

#[async_trait]
impl<P: Provider + ?Sized> Provider for std::sync::Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn default_model(&self) -> &str {
        (**self).default_model()
    }

    async fn complete(
        &self,
        request: &GenerationRequest,
    ) -> SmithResult<(GenerationResult, Usage)> {
        (**self).complete(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_usage_creation() {
        let usage = Usage::new(Some(10), Some(20), Some(30));
        assert_eq!(usage.input_tokens, Some(10));
        assert_eq!(usage.output_tokens, Some(20));
        assert_eq!(usage.total_tokens, Some(30));
    }

    #[test]
    fn test_sampling_merge_prefers_override() {
        let base = SamplingParams {
            temperature: Some(0.2),
            top_p: None,
            max_tokens: Some(2000),
        };
        let merged = base.merged_with(SamplingParams {
            temperature: Some(1.0),
            top_p: Some(1.0),
            max_tokens: None,
        });
        assert_eq!(merged.temperature, Some(1.0));
        assert_eq!(merged.top_p, Some(1.0));
        assert_eq!(merged.max_tokens, Some(2000));
    }

    #[test]
    fn test_result_from_content() {
        let text = GenerationResult::from_content("plain".to_string(), false);
        assert_eq!(text, GenerationResult::Text("plain".to_string()));

        let parsed = GenerationResult::from_content("{\"a\": 1}".to_string(), true);
        assert_eq!(parsed.as_structured(), Some(&json!({"a": 1})));
        assert_eq!(parsed.into_text(), "{\"a\":1}");

        // Unparseable structured output falls back to text
        let fallback = GenerationResult::from_content("not json".to_string(), true);
        assert_eq!(fallback, GenerationResult::Text("not json".to_string()));
    }

    #[test]
    fn test_request_builder() {
        let request = GenerationRequest::new("gpt-4o", vec![Message::user("hi")])
            .with_response_format(ResponseFormat::JsonObject);
        assert!(request.wants_structured());
        assert_eq!(request.sampling, SamplingParams::default());
    }
}
