use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::base::{GenerationRequest, GenerationResult, Provider, ResponseFormat, Usage};
use super::configs::OpenAiProviderConfig;
use super::utils::{get_openai_usage, handle_response, messages_to_openai_spec, openai_response_to_result};
use crate::errors::SmithResult;

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> SmithResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    fn build_payload(&self, request: &GenerationRequest) -> Value {
        let mut payload = json!({
            "model": request.model,
            "messages": messages_to_openai_spec(&request.messages),
        });

        let sampling = request.sampling;
        let Some(body) = payload.as_object_mut() else {
            return payload;
        };
        if let Some(temp) = sampling.temperature.or(self.config.temperature) {
            body.insert("temperature".to_string(), json!(temp));
        }
        if let Some(top_p) = sampling.top_p {
            body.insert("top_p".to_string(), json!(top_p));
        }
        if let Some(tokens) = sampling.max_tokens.or(self.config.max_tokens) {
            body.insert("max_tokens".to_string(), json!(tokens));
        }
        if let Some(format) = request.response_format {
            let kind = match format {
                ResponseFormat::Text => "text",
                ResponseFormat::JsonObject => "json_object",
            };
            body.insert("response_format".to_string(), json!({ "type": kind }));
        }

        payload
    }

    async fn post(&self, payload: Value) -> SmithResult<Value> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        handle_response(response).await
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.config.model
    }

    async fn complete(
        &self,
        request: &GenerationRequest,
    ) -> SmithResult<(GenerationResult, Usage)> {
        let payload = self.build_payload(request);
        tracing::debug!(model = %request.model, messages = request.messages.len(), "openai request");

        let response = self.post(payload).await?;

        let result = openai_response_to_result(&response, request.wants_structured())?;
        let usage = get_openai_usage(&response);

        Ok((result, usage))
    }
}
