use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{SmithError, SmithResult};
use crate::models::message::Message;
use crate::models::role::Role;
use crate::providers::base::{GenerationRequest, Provider, ResponseFormat, SamplingParams};
use crate::tasks::{TaskKind, TaskTemplate, HISTORY_NOTE};

pub const MAX_INPUT_CHARS: usize = 4000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblerConfig {
    /// Model to request, falls back to the provider default
    pub model: Option<String>,
    pub sampling: SamplingParams,
    pub max_input_chars: usize,
    /// Per-template model, takes precedence over `model`
    #[serde(default)]
    pub template_models: HashMap<TaskTemplate, String>,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            model: None,
            sampling: SamplingParams::default(),
            max_input_chars: MAX_INPUT_CHARS,
            template_models: HashMap::new(),
        }
    }
}

/// Everything needed to phrase one task for the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    #[serde(default)]
    pub kind: TaskKind,
    pub template: TaskTemplate,
    pub subjects: Vec<String>,
    #[serde(default)]
    pub history: Option<Vec<Message>>,
    #[serde(default)]
    pub response_format: Option<ResponseFormat>,
}

impl TaskRequest {
    pub fn new<I, S>(template: TaskTemplate, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: TaskKind::default(),
            template,
            subjects: subjects.into_iter().map(Into::into).collect(),
            history: None,
            response_format: None,
        }
    }

    pub fn with_kind(mut self, kind: TaskKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }
}

/// Reject blank input and input longer than `max_chars` characters
pub fn validate_input(input: &str, max_chars: usize) -> SmithResult<()> {
    if input.trim().is_empty() {
        return Err(SmithError::EmptyInput);
    }

    let length = input.chars().count();
    if length > max_chars {
        return Err(SmithError::InputTooLong {
            length,
            max: max_chars,
        });
    }

    Ok(())
}

/// Builds the message sequence for a task and runs it through a provider
pub struct PromptAssembler {
    provider: Arc<dyn Provider>,
    config: AssemblerConfig,
}

impl PromptAssembler {
    pub fn new(provider: Arc<dyn Provider>, config: AssemblerConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Validate the subjects and lay out the messages. Nothing here touches
    /// the network, so the same request always yields the same sequence.
    pub fn build_messages(&self, request: &TaskRequest) -> SmithResult<Vec<Message>> {
        let template = request.template;
        let expected = template.slots().len();
        if request.subjects.len() != expected {
            return Err(SmithError::SubjectCount {
                template: template.to_string(),
                expected,
                actual: request.subjects.len(),
            });
        }
        for subject in &request.subjects {
            validate_input(subject, self.config.max_input_chars)?;
        }

        let system = template
            .system_override()
            .unwrap_or_else(|| request.kind.system_instruction());

        // the system instruction always leads, exactly once
        let history: Vec<Message> = request
            .history
            .iter()
            .flatten()
            .filter(|message| message.role != Role::System)
            .cloned()
            .collect();
        if template == TaskTemplate::Revision && history.is_empty() {
            return Err(SmithError::InvalidRequest(
                "revision needs the conversation so far as history".to_string(),
            ));
        }

        let mut content = template.render(&request.subjects)?;
        if !history.is_empty() && template != TaskTemplate::Revision {
            content.push_str("\n\n");
            content.push_str(HISTORY_NOTE);
        }

        let mut messages = vec![Message::system(system)];
        messages.extend(history);
        messages.push(Message::user(content));

        Ok(messages)
    }

    pub fn build_request(&self, request: &TaskRequest) -> SmithResult<GenerationRequest> {
        let messages = self.build_messages(request)?;
        let model = self
            .config
            .template_models
            .get(&request.template)
            .or(self.config.model.as_ref())
            .cloned()
            .unwrap_or_else(|| self.provider.default_model().to_string());
        let sampling = self.config.sampling.merged_with(request.template.sampling());

        let mut generation = GenerationRequest::new(model, messages).with_sampling(sampling);
        if let Some(format) = request.response_format {
            generation = generation.with_response_format(format);
        }
        Ok(generation)
    }

    /// Assemble the task and return the model's text unmodified
    pub async fn build_and_run(&self, request: &TaskRequest) -> SmithResult<String> {
        let generation = self.build_request(request)?;

        tracing::info!(
            provider = self.provider.name(),
            template = %request.template,
            kind = %request.kind,
            "running task"
        );

        match self.provider.complete(&generation).await {
            Ok((result, usage)) => {
                tracing::debug!(?usage, "task complete");
                Ok(result.into_text())
            }
            Err(err) => {
                tracing::error!(template = %request.template, error = %err, "task failed");
                Err(err)
            }
        }
    }
}
