use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use smith::compiler::CompiledArtifact;

#[derive(Debug, Deserialize)]
struct CompileRequest {
    code: String,
    #[serde(default)]
    config: String,
}

async fn compile_handler(
    State(state): State<AppState>,
    payload: Result<Json<CompileRequest>, JsonRejection>,
) -> Result<Json<CompiledArtifact>, ApiError> {
    let Json(request) = payload?;
    let compiler = state
        .compiler
        .as_ref()
        .ok_or(ApiError::NotConfigured("compiler"))?;

    let artifact = compiler.compile(&request.code, &request.config).await?;
    Ok(Json(artifact))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/compile", post(compile_handler))
        .with_state(state)
}
