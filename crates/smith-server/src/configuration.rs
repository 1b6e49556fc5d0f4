use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment};
use serde::Deserialize;
use smith::{
    assembler::{AssemblerConfig, MAX_INPUT_CHARS},
    compiler::CompilerConfig,
    providers::{
        base::SamplingParams,
        configs::{
            AnthropicProviderConfig, OpenAiProviderConfig, ProviderConfig, ANTHROPIC_HOST,
            ANTHROPIC_MAX_TOKENS, ANTHROPIC_MODEL, OPENAI_HOST, OPENAI_MODEL,
        },
        retry::{RetryPolicy, MAX_RETRIES, RETRY_DELAY},
    },
    tasks::TaskTemplate,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Other(config::ConfigError::Message(format!("{}", e))))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum ProviderSettings {
    OpenAi {
        #[serde(default = "default_openai_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    Anthropic {
        #[serde(default = "default_anthropic_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_anthropic_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

impl ProviderSettings {
    // Convert to the smith ProviderConfig
    pub fn into_config(self) -> ProviderConfig {
        match self {
            ProviderSettings::OpenAi {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
                timeout_secs,
            } => ProviderConfig::OpenAi(OpenAiProviderConfig {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
                timeout: Duration::from_secs(timeout_secs),
            }),
            ProviderSettings::Anthropic {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
                timeout_secs,
            } => ProviderConfig::Anthropic(AnthropicProviderConfig {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
                timeout: Duration::from_secs(timeout_secs),
            }),
        }
    }
}

/// Target of the `/claude` forwarding route
#[derive(Debug, Deserialize)]
pub struct ClaudeSettings {
    #[serde(default = "default_anthropic_host")]
    pub host: String,
    pub api_key: String,
    #[serde(default = "default_anthropic_model")]
    pub model: String,
    #[serde(default = "default_claude_max_tokens")]
    pub max_tokens: i32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ClaudeSettings {
    pub fn into_config(self) -> ProviderConfig {
        ProviderConfig::Anthropic(AnthropicProviderConfig {
            host: self.host,
            api_key: self.api_key,
            model: self.model,
            temperature: None,
            max_tokens: Some(self.max_tokens),
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CompilerSettings {
    pub host: String,
    #[serde(default = "default_compile_timeout_secs")]
    pub timeout_secs: u64,
}

impl CompilerSettings {
    pub fn into_config(self) -> CompilerConfig {
        CompilerConfig {
            host: self.host,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.delay_ms))
    }
}

#[derive(Debug, Deserialize)]
pub struct LimitSettings {
    pub max_input_chars: usize,
}

/// Models pinned to individual templates
#[derive(Debug, Default, Deserialize)]
pub struct TemplateSettings {
    #[serde(default)]
    pub config_file_model: Option<String>,
}

impl TemplateSettings {
    pub fn models(&self) -> HashMap<TaskTemplate, String> {
        self.config_file_model
            .iter()
            .map(|model| (TaskTemplate::ConfigFile, model.clone()))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    #[serde(default)]
    pub claude: Option<ClaudeSettings>,
    #[serde(default)]
    pub compiler: Option<CompilerSettings>,
    pub retry: RetrySettings,
    pub limits: LimitSettings,
    #[serde(default)]
    pub templates: TemplateSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    pub fn assembler_config(&self) -> AssemblerConfig {
        let (model, temperature, max_tokens) = match &self.provider {
            ProviderSettings::OpenAi {
                model,
                temperature,
                max_tokens,
                ..
            }
            | ProviderSettings::Anthropic {
                model,
                temperature,
                max_tokens,
                ..
            } => (model.clone(), *temperature, *max_tokens),
        };

        AssemblerConfig {
            model: Some(model),
            sampling: SamplingParams {
                temperature,
                top_p: None,
                max_tokens,
            },
            max_input_chars: self.limits.max_input_chars,
            template_models: self.templates.models(),
        }
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        // Start with default configuration
        let config = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            // Retry and validation defaults
            .set_default("retry.max_attempts", MAX_RETRIES as i64)?
            .set_default("retry.delay_ms", RETRY_DELAY.as_millis() as i64)?
            .set_default("limits.max_input_chars", MAX_INPUT_CHARS as i64)?
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("SMITH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Try to deserialize the configuration
        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        // Handle missing field errors specially
        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    // Extract field name from error message "missing field `type`"
                    let field = error_str
                        .split('`')
                        .nth(1)
                        .unwrap_or_default();
                    let env_var = to_env_var(field);
                    Err(ConfigError::MissingEnvVar { env_var })
                } else if let config::ConfigError::NotFound(field) = &err {
                    let env_var = to_env_var(field);
                    Err(ConfigError::MissingEnvVar { env_var })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_openai_host() -> String {
    OPENAI_HOST.to_string()
}

fn default_openai_model() -> String {
    OPENAI_MODEL.to_string()
}

fn default_anthropic_host() -> String {
    ANTHROPIC_HOST.to_string()
}

fn default_anthropic_model() -> String {
    ANTHROPIC_MODEL.to_string()
}

fn default_claude_max_tokens() -> i32 {
    ANTHROPIC_MAX_TOKENS
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_compile_timeout_secs() -> u64 {
    120
}
