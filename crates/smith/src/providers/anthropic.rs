use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::base::{GenerationRequest, GenerationResult, Provider, Usage};
use super::configs::{AnthropicProviderConfig, ANTHROPIC_MAX_TOKENS, ANTHROPIC_VERSION};
use super::utils::{
    anthropic_response_to_result, get_anthropic_usage, handle_response, messages_to_anthropic_spec,
};
use crate::errors::SmithResult;

pub struct AnthropicProvider {
    client: Client,
    config: AnthropicProviderConfig,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicProviderConfig) -> SmithResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    fn build_payload(&self, request: &GenerationRequest) -> Value {
        let (system, messages) = messages_to_anthropic_spec(&request.messages);
        let sampling = request.sampling;

        let mut payload = json!({
            "model": request.model,
            "messages": messages,
            "max_tokens": sampling
                .max_tokens
                .or(self.config.max_tokens)
                .unwrap_or(ANTHROPIC_MAX_TOKENS),
        });

        let Some(body) = payload.as_object_mut() else {
            return payload;
        };
        if let Some(system) = system {
            body.insert("system".to_string(), json!(system));
        }
        if let Some(temp) = sampling.temperature.or(self.config.temperature) {
            body.insert("temperature".to_string(), json!(temp));
        }
        if let Some(top_p) = sampling.top_p {
            body.insert("top_p".to_string(), json!(top_p));
        }

        payload
    }

    async fn post(&self, payload: Value) -> SmithResult<Value> {
        let url = format!("{}/v1/messages", self.config.host.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&payload)
            .send()
            .await?;

        handle_response(response).await
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn default_model(&self) -> &str {
        &self.config.model
    }

    async fn complete(
        &self,
        request: &GenerationRequest,
    ) -> SmithResult<(GenerationResult, Usage)> {
        let payload = self.build_payload(request);
        tracing::debug!(model = %request.model, messages = request.messages.len(), "anthropic request");

        let response = self.post(payload).await?;

        // Anthropic has no JSON mode, a structured hint only changes how the text is parsed
        let result = anthropic_response_to_result(&response, request.wants_structured())?;
        let usage = get_anthropic_usage(&response);

        Ok((result, usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SmithError;
    use crate::models::message::Message;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup_mock_server(response: ResponseTemplate) -> (MockServer, AnthropicProvider) {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test_api_key"))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(response)
            .mount(&mock_server)
            .await;

        let config = AnthropicProviderConfig {
            host: mock_server.uri(),
            ..AnthropicProviderConfig::new("test_api_key")
        };

        let provider = AnthropicProvider::new(config).unwrap();
        (mock_server, provider)
    }

    #[tokio::test]
    async fn test_complete_basic() -> anyhow::Result<()> {
        let response_body = json!({
            "id": "msg_123",
            "type": "message",
            "role": "assistant",
            "content": [{
                "type": "text",
                "text": "Hello! How can I assist you today?"
            }],
            "model": "claude-3-opus-20240229",
            "stop_reason": "end_turn",
            "stop_sequence": null,
            "usage": {
                "input_tokens": 12,
                "output_tokens": 15
            }
        });

        let (_server, provider) =
            setup_mock_server(ResponseTemplate::new(200).set_body_json(response_body)).await;

        let request = GenerationRequest::new(
            "claude-3-opus-20240229",
            vec![Message::user("Hello?")],
        );
        let (result, usage) = provider.complete(&request).await?;

        assert_eq!(
            result,
            GenerationResult::Text("Hello! How can I assist you today?".to_string())
        );
        assert_eq!(usage.input_tokens, Some(12));
        assert_eq!(usage.output_tokens, Some(15));
        assert_eq!(usage.total_tokens, Some(27));

        Ok(())
    }

    #[tokio::test]
    async fn test_system_is_sent_top_level() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_partial_json(json!({
                "system": "You are a DAO expert.",
                "messages": [{"role": "user", "content": "Design a vote"}],
                "max_tokens": 1000
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "ok"}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = AnthropicProviderConfig {
            host: mock_server.uri(),
            ..AnthropicProviderConfig::new("test_api_key")
        };
        let provider = AnthropicProvider::new(config)?;
        let request = GenerationRequest::new(
            "claude-3-opus-20240229",
            vec![
                Message::system("You are a DAO expert."),
                Message::user("Design a vote"),
            ],
        );

        let (result, _) = provider.complete(&request).await?;
        assert_eq!(result.into_text(), "ok");
        Ok(())
    }

    #[tokio::test]
    async fn test_authentication_error() {
        let (_server, provider) = setup_mock_server(ResponseTemplate::new(401).set_body_json(json!({
            "type": "error",
            "error": {"type": "authentication_error", "message": "invalid x-api-key"}
        })))
        .await;

        let request = GenerationRequest::new("claude-3-opus-20240229", vec![Message::user("Hi")]);
        let err = provider.complete(&request).await.unwrap_err();
        assert_eq!(
            err,
            SmithError::AuthenticationError("invalid x-api-key".to_string())
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let (_server, provider) =
            setup_mock_server(ResponseTemplate::new(200).set_body_json(json!({"content": []}))).await;

        let request = GenerationRequest::new("claude-3-opus-20240229", vec![Message::user("Hi")]);
        let err = provider.complete(&request).await.unwrap_err();
        assert!(matches!(err, SmithError::InvalidResponse(_)));
    }
}
