use super::{
    anthropic::AnthropicProvider,
    base::Provider,
    configs::ProviderConfig,
    openai::OpenAiProvider,
    retry::{RetryPolicy, RetryingProvider},
};
use crate::errors::SmithResult;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(EnumIter, EnumString, Display, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    OpenAi,
    Anthropic,
}

impl ProviderConfig {
    pub fn provider_type(&self) -> ProviderType {
        match self {
            ProviderConfig::OpenAi(_) => ProviderType::OpenAi,
            ProviderConfig::Anthropic(_) => ProviderType::Anthropic,
        }
    }
}

pub fn get_provider(config: ProviderConfig) -> SmithResult<Box<dyn Provider>> {
    match config {
        ProviderConfig::OpenAi(openai_config) => Ok(Box::new(OpenAiProvider::new(openai_config)?)),
        ProviderConfig::Anthropic(anthropic_config) => {
            Ok(Box::new(AnthropicProvider::new(anthropic_config)?))
        }
    }
}

/// Build a provider that retries rate limited requests according to `policy`
pub fn get_retrying_provider(
    config: ProviderConfig,
    policy: RetryPolicy,
) -> SmithResult<Box<dyn Provider>> {
    let provider = get_provider(config)?;
    Ok(Box::new(RetryingProvider::new(provider, policy)))
}
