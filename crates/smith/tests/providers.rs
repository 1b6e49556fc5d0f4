use anyhow::Result;
use serde_json::{json, Value};
use smith::{
    assembler::{AssemblerConfig, PromptAssembler, TaskRequest},
    errors::SmithError,
    providers::{
        configs::{AnthropicProviderConfig, OpenAiProviderConfig, ProviderConfig},
        factory::get_retrying_provider,
        retry::RetryPolicy,
    },
    tasks::{TaskKind, TaskTemplate},
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Generic harness that drives a provider config end to end through the
/// retry layer and the assembler against a local mock endpoint
struct ProviderTester {
    server: MockServer,
    endpoint: &'static str,
    success_body: Value,
    config: fn(&MockServer) -> ProviderConfig,
}

impl ProviderTester {
    async fn openai() -> Self {
        Self {
            server: MockServer::start().await,
            endpoint: "/v1/chat/completions",
            success_body: json!({
                "choices": [{"message": {"role": "assistant", "content": "contract Token {}"}}],
                "usage": {"prompt_tokens": 5, "completion_tokens": 4, "total_tokens": 9}
            }),
            config: |server| {
                ProviderConfig::OpenAi(OpenAiProviderConfig {
                    host: server.uri(),
                    ..OpenAiProviderConfig::new("test_api_key")
                })
            },
        }
    }

    async fn anthropic() -> Self {
        Self {
            server: MockServer::start().await,
            endpoint: "/v1/messages",
            success_body: json!({
                "content": [{"type": "text", "text": "contract Token {}"}],
                "usage": {"input_tokens": 5, "output_tokens": 4}
            }),
            config: |server| {
                ProviderConfig::Anthropic(AnthropicProviderConfig {
                    host: server.uri(),
                    ..AnthropicProviderConfig::new("test_api_key")
                })
            },
        }
    }

    fn assembler(&self) -> Result<PromptAssembler> {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let provider = get_retrying_provider((self.config)(&self.server), policy)?;
        Ok(PromptAssembler::new(
            Arc::from(provider),
            AssemblerConfig::default(),
        ))
    }

    async fn mount_rate_limits(&self, times: u64) {
        Mock::given(method("POST"))
            .and(path(self.endpoint))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_json(json!({"error": {"message": "slow down"}})),
            )
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    async fn mount_success(&self) {
        Mock::given(method("POST"))
            .and(path(self.endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(self.success_body.clone()))
            .mount(&self.server)
            .await;
    }

    async fn received(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }

    async fn test_recovers_from_rate_limit(&self) -> Result<()> {
        self.mount_rate_limits(2).await;
        self.mount_success().await;

        let request = TaskRequest::new(TaskTemplate::PseudoCode, ["ERC20-like token"])
            .with_kind(TaskKind::Defi);
        let text = self.assembler()?.build_and_run(&request).await?;

        assert_eq!(text, "contract Token {}");
        assert_eq!(self.received().await, 3);
        Ok(())
    }

    async fn test_gives_up_after_bound(&self) -> Result<()> {
        self.mount_rate_limits(10).await;

        let request = TaskRequest::new(TaskTemplate::TestCases, ["contract Token {}"]);
        let err = self.assembler()?.build_and_run(&request).await.unwrap_err();

        assert_eq!(err, SmithError::MaxRetriesExceeded { attempts: 3 });
        assert_eq!(self.received().await, 3);
        Ok(())
    }

    async fn test_bad_request_is_not_retried(&self) -> Result<()> {
        Mock::given(method("POST"))
            .and(path(self.endpoint))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error": {"message": "unsupported parameter"}})),
            )
            .mount(&self.server)
            .await;

        let request = TaskRequest::new(TaskTemplate::Interfaces, ["contract Token {}"]);
        let err = self.assembler()?.build_and_run(&request).await.unwrap_err();

        assert_eq!(
            err,
            SmithError::InvalidRequest("unsupported parameter".to_string())
        );
        assert_eq!(self.received().await, 1);
        Ok(())
    }
}

#[tokio::test]
async fn openai_recovers_from_rate_limit() -> Result<()> {
    ProviderTester::openai().await.test_recovers_from_rate_limit().await
}

#[tokio::test]
async fn openai_gives_up_after_bound() -> Result<()> {
    ProviderTester::openai().await.test_gives_up_after_bound().await
}

#[tokio::test]
async fn openai_bad_request_is_not_retried() -> Result<()> {
    ProviderTester::openai().await.test_bad_request_is_not_retried().await
}

#[tokio::test]
async fn anthropic_recovers_from_rate_limit() -> Result<()> {
    ProviderTester::anthropic().await.test_recovers_from_rate_limit().await
}

#[tokio::test]
async fn anthropic_gives_up_after_bound() -> Result<()> {
    ProviderTester::anthropic().await.test_gives_up_after_bound().await
}

#[tokio::test]
async fn anthropic_bad_request_is_not_retried() -> Result<()> {
    ProviderTester::anthropic().await.test_bad_request_is_not_retried().await
}
