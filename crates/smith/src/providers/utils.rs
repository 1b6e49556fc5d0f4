use reqwest::{Response, StatusCode};
use serde_json::{json, Value};

use super::base::{GenerationResult, Usage};
use crate::errors::{SmithError, SmithResult};
use crate::models::message::Message;
use crate::models::role::Role;

/// Convert internal messages to OpenAI's chat message specification
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| {
            json!({
                "role": message.role.as_str(),
                "content": message.content,
            })
        })
        .collect()
}

/// Convert internal messages to Anthropic's message specification
///   anthropic does not accept a system role inside the message list, so system
///   text is lifted out and returned separately for the top level `system` field
pub fn messages_to_anthropic_spec(messages: &[Message]) -> (Option<String>, Vec<Value>) {
    let mut system_parts = Vec::new();
    let mut spec = Vec::new();

    for message in messages {
        match message.role {
            Role::System => system_parts.push(message.content.as_str()),
            Role::User | Role::Assistant => spec.push(json!({
                "role": message.role.as_str(),
                "content": message.content,
            })),
        }
    }

    let system = if system_parts.is_empty() {
        None
    } else {
        Some(system_parts.join("\n\n"))
    };
    (system, spec)
}

/// Pull a human readable message out of an error body from either provider
pub fn error_message(body: &Value) -> Option<String> {
    match body.get("error") {
        Some(Value::String(message)) => Some(message.clone()),
        Some(error) => error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        None => body
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .or_else(|| body.as_str().map(str::to_string)),
    }
}

pub fn check_context_length_error(body: &Value) -> Option<SmithError> {
    let error = body.get("error").unwrap_or(body);
    let code = error.get("code").and_then(|c| c.as_str()).unwrap_or_default();
    let message = error_message(body).unwrap_or_else(|| "Unknown error".to_string());

    let lowered = message.to_lowercase();
    if code == "context_length_exceeded"
        || code == "string_above_max_length"
        || lowered.contains("maximum context length")
        || lowered.contains("prompt is too long")
    {
        Some(SmithError::ContextLengthExceeded(message))
    } else {
        None
    }
}

/// Map a failed response to the error taxonomy. This is the only place
/// response bodies are inspected for error shapes.
pub fn classify_error(status: StatusCode, body: &Value) -> SmithError {
    let message = error_message(body).unwrap_or_else(|| status.to_string());

    match status {
        StatusCode::TOO_MANY_REQUESTS => SmithError::RateLimitExceeded,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SmithError::AuthenticationError(message),
        StatusCode::BAD_REQUEST
        | StatusCode::PAYLOAD_TOO_LARGE
        | StatusCode::NOT_FOUND
        | StatusCode::UNPROCESSABLE_ENTITY => {
            check_context_length_error(body).unwrap_or(SmithError::InvalidRequest(message))
        }
        status if status.is_server_error() => SmithError::ServerError {
            status: status.as_u16(),
            message,
        },
        StatusCode::OK => classify_embedded_error(body),
        _ => SmithError::UnknownError(format!("{}: {}", status, message)),
    }
}

/// Some endpoints answer 200 with an `error` object in the body
fn classify_embedded_error(body: &Value) -> SmithError {
    if let Some(err) = check_context_length_error(body) {
        return err;
    }

    let message = error_message(body).unwrap_or_else(|| "Unknown error".to_string());
    let error = body.get("error").unwrap_or(body);
    let kind = error
        .get("type")
        .or_else(|| error.get("code"))
        .and_then(|t| t.as_str())
        .unwrap_or_default();

    match kind {
        "rate_limit_error" | "rate_limit_exceeded" => SmithError::RateLimitExceeded,
        "authentication_error" | "invalid_api_key" | "permission_error" => {
            SmithError::AuthenticationError(message)
        }
        "invalid_request_error" => SmithError::InvalidRequest(message),
        "server_error" | "api_error" | "overloaded_error" => SmithError::ServerError {
            status: 500,
            message,
        },
        _ => SmithError::UnknownError(message),
    }
}

/// Turn an HTTP response into its JSON body or a classified error
pub async fn handle_response(response: Response) -> SmithResult<Value> {
    let status = response.status();
    let text = response.text().await?;
    let body: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

    if status.is_success() {
        if body.get("error").map_or(false, |e| !e.is_null()) {
            return Err(classify_error(StatusCode::OK, &body));
        }
        if !body.is_object() {
            return Err(SmithError::InvalidResponse(format!(
                "expected a JSON object, got: {}",
                body
            )));
        }
        Ok(body)
    } else {
        Err(classify_error(status, &body))
    }
}

pub fn openai_response_to_result(response: &Value, structured: bool) -> SmithResult<GenerationResult> {
    let content = response
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| SmithError::InvalidResponse("No choices in OpenAI response".to_string()))?
        .get("content")
        .and_then(|c| c.as_str())
        .unwrap_or_default()
        .to_string();

    Ok(GenerationResult::from_content(content, structured))
}

pub fn anthropic_response_to_result(
    response: &Value,
    structured: bool,
) -> SmithResult<GenerationResult> {
    let content = response
        .get("content")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|first| first.get("text"))
        .and_then(|text| text.as_str())
        .ok_or_else(|| {
            SmithError::InvalidResponse("Invalid response format from Anthropic API".to_string())
        })?
        .to_string();

    Ok(GenerationResult::from_content(content, structured))
}

fn token_count(usage: &Value, key: &str) -> Option<i32> {
    usage.get(key).and_then(|v| v.as_i64()).map(|v| v as i32)
}

pub fn get_openai_usage(response: &Value) -> Usage {
    let Some(usage) = response.get("usage") else {
        return Usage::default();
    };

    let input_tokens = token_count(usage, "prompt_tokens");
    let output_tokens = token_count(usage, "completion_tokens");
    let total_tokens = token_count(usage, "total_tokens").or_else(|| match (input_tokens, output_tokens) {
        (Some(input), Some(output)) => Some(input + output),
        _ => None,
    });

    Usage::new(input_tokens, output_tokens, total_tokens)
}

pub fn get_anthropic_usage(response: &Value) -> Usage {
    let Some(usage) = response.get("usage") else {
        return Usage::default();
    };

    let input_tokens = token_count(usage, "input_tokens");
    let output_tokens = token_count(usage, "output_tokens");
    let total_tokens = match (input_tokens, output_tokens) {
        (Some(input), Some(output)) => Some(input + output),
        _ => None,
    };

    Usage::new(input_tokens, output_tokens, total_tokens)
}
