use anyhow::{Context, Result};
use clap::Args;
use smith::providers::{
    base::Provider,
    configs::{AnthropicProviderConfig, OpenAiProviderConfig, ProviderConfig},
    factory::{get_retrying_provider, ProviderType},
    retry::{RetryPolicy, MAX_RETRIES, RETRY_DELAY},
};
use std::env;
use std::time::Duration;

#[derive(Args, Debug, Clone)]
pub struct ProviderArgs {
    /// Provider option (openai or anthropic)
    #[arg(short, long, default_value = "openai")]
    pub provider: ProviderType,

    /// API key (can also be set via OPENAI_API_KEY or ANTHROPIC_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Override the provider's base url
    #[arg(long)]
    pub host: Option<String>,

    /// Model to use, defaults to the provider's model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Attempts made while the provider keeps rate limiting
    #[arg(long, default_value_t = MAX_RETRIES)]
    pub max_attempts: u32,

    /// Wait between rate limited attempts
    #[arg(long, default_value_t = RETRY_DELAY.as_millis() as u64)]
    pub retry_delay_ms: u64,
}

impl ProviderArgs {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn config(&self) -> Result<ProviderConfig> {
        match self.provider {
            ProviderType::OpenAi => {
                let api_key = self
                    .api_key
                    .clone()
                    .or_else(|| env::var("OPENAI_API_KEY").ok())
                    .context(
                        "API key must be provided via --api-key or OPENAI_API_KEY environment variable",
                    )?;

                let mut config = OpenAiProviderConfig::new(api_key);
                if let Some(host) = &self.host {
                    config.host = host.clone();
                }
                if let Some(model) = &self.model {
                    config.model = model.clone();
                }
                Ok(ProviderConfig::OpenAi(config))
            }
            ProviderType::Anthropic => {
                let api_key = self
                    .api_key
                    .clone()
                    .or_else(|| env::var("ANTHROPIC_API_KEY").ok())
                    .context(
                        "API key must be provided via --api-key or ANTHROPIC_API_KEY environment variable",
                    )?;

                let mut config = AnthropicProviderConfig::new(api_key);
                if let Some(host) = &self.host {
                    config.host = host.clone();
                }
                if let Some(model) = &self.model {
                    config.model = model.clone();
                }
                Ok(ProviderConfig::Anthropic(config))
            }
        }
    }

    pub fn build(&self) -> Result<Box<dyn Provider>> {
        Ok(get_retrying_provider(self.config()?, self.policy())?)
    }
}
