use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use crate::errors::SmithResult;
use crate::providers::base::{GenerationRequest, GenerationResult, Provider, Usage};

/// A mock provider that returns pre-configured responses for testing.
/// Once the script runs out it echoes the request messages back as JSON.
pub struct MockProvider {
    responses: Arc<Mutex<Vec<SmithResult<GenerationResult>>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<SmithResult<GenerationResult>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn echo() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_text(text: &str) -> Self {
        Self::new(vec![Ok(GenerationResult::Text(text.to_string()))])
    }

    /// Number of `complete` calls seen so far
    pub fn attempts(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn complete(
        &self,
        request: &GenerationRequest,
    ) -> SmithResult<(GenerationResult, Usage)> {
        self.requests.lock().unwrap().push(request.clone());

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            let echoed = serde_json::to_string(&request.messages).unwrap();
            Ok((GenerationResult::Text(echoed), Usage::default()))
        } else {
            responses.remove(0).map(|result| (result, Usage::default()))
        }
    }
}
