use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use smith::{
    errors::SmithError,
    models::message::Message,
    providers::base::GenerationRequest,
};

#[derive(Debug, Deserialize)]
struct ClaudeRequest {
    messages: Vec<Message>,
}

/// Normalized reply, the same shape whichever upstream answered
#[derive(Debug, Serialize, Deserialize)]
struct ClaudeResponse {
    content: String,
}

/// Forward a conversation to the Anthropic endpoint, keeping the API key on the server
async fn claude_handler(
    State(state): State<AppState>,
    payload: Result<Json<ClaudeRequest>, JsonRejection>,
) -> Result<Json<ClaudeResponse>, ApiError> {
    let Json(request) = payload?;
    let provider = state
        .claude
        .as_ref()
        .ok_or(ApiError::NotConfigured("claude forwarding"))?;

    if request.messages.is_empty() {
        return Err(SmithError::EmptyInput.into());
    }

    let generation = GenerationRequest::new(provider.default_model(), request.messages);
    let (result, _usage) = provider.complete(&generation).await?;

    Ok(Json(ClaudeResponse {
        content: result.into_text(),
    }))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/claude", post(claude_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{body_json, post_json, state_with, StubProvider};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::json;
    use smith::{models::role::Role, providers::base::Provider};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn claude_app(claude: Arc<StubProvider>) -> Router {
        let claude: Arc<dyn Provider> = claude;
        let mut state = state_with(StubProvider::text("unused"));
        state.claude = Some(claude);
        routes(state)
    }

    #[tokio::test]
    async fn test_forwards_messages() {
        let claude = StubProvider::text("Here is your contract");
        let app = claude_app(claude.clone());

        let response = app
            .oneshot(post_json(
                "/claude",
                json!({"messages": [{"role": "user", "content": "Write a vault"}]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"content": "Here is your contract"})
        );

        let requests = claude.requests.lock().unwrap();
        assert_eq!(requests[0].model, "stub-model");
        assert_eq!(requests[0].messages[0].role, Role::User);
        assert_eq!(requests[0].messages[0].content, "Write a vault");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_reported() {
        let claude = StubProvider::new(Err(SmithError::ServerError {
            status: 529,
            message: "Overloaded".to_string(),
        }));
        let app = claude_app(claude);

        let response = app
            .oneshot(post_json(
                "/claude",
                json!({"messages": [{"role": "user", "content": "hi"}]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["kind"], "server_error");
    }

    #[tokio::test]
    async fn test_not_configured() {
        let app = routes(state_with(StubProvider::text("unused")));

        let response = app
            .oneshot(post_json("/claude", json!({"messages": []})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_other_methods_not_allowed() {
        let app = claude_app(StubProvider::text("unused"));

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/claude")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");
    }
}
