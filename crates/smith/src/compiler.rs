use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::errors::{SmithError, SmithResult};
use crate::providers::utils::handle_response;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    pub host: String,
    pub timeout: Duration,
}

impl CompilerConfig {
    pub fn new<S: Into<String>>(host: S) -> Self {
        Self {
            host: host.into(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Deployable output of the compiler service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledArtifact {
    pub manifest: Value,
    pub nef: String,
}

/// Client for the external compiler service. It only shapes the request and
/// unwraps the response envelope; compilation happens remotely.
pub struct CompilerClient {
    client: Client,
    config: CompilerConfig,
}

impl CompilerClient {
    pub fn new(config: CompilerConfig) -> SmithResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub async fn compile(&self, code: &str, config: &str) -> SmithResult<CompiledArtifact> {
        if code.trim().is_empty() {
            return Err(SmithError::EmptyInput);
        }

        let url = format!("{}/compile", self.config.host.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "code": code,
                "config": config,
            }))
            .send()
            .await?;

        let body = handle_response(response).await?;
        let artifact = parse_envelope(&body)?;
        tracing::info!(nef_len = artifact.nef.len(), "compile succeeded");
        Ok(artifact)
    }
}

// The service wraps its own status inside a 200 response:
// { "response": { "status": 200 }, "data": { "manifest": .., "nef": .. }, "message": .. }
fn parse_envelope(body: &Value) -> SmithResult<CompiledArtifact> {
    let status = body
        .get("response")
        .and_then(|r| r.get("status"))
        .and_then(|s| s.as_u64());

    if status != Some(200) {
        let message = body
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Error Compiling the Code")
            .to_string();
        tracing::warn!(?status, %message, "compile rejected");
        return Err(SmithError::CompilationFailed(message));
    }

    let data = body
        .get("data")
        .ok_or_else(|| SmithError::InvalidResponse("compiler response has no data".to_string()))?;
    let manifest = data
        .get("manifest")
        .cloned()
        .ok_or_else(|| SmithError::InvalidResponse("compiler response has no manifest".to_string()))?;
    let nef = match data.get("nef") {
        Some(Value::String(nef)) => nef.clone(),
        Some(other) => other.to_string(),
        None => {
            return Err(SmithError::InvalidResponse(
                "compiler response has no nef".to_string(),
            ))
        }
    };

    Ok(CompiledArtifact { manifest, nef })
}
