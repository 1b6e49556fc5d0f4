use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use smith::{assembler::TaskRequest, tasks::TaskTemplate};
use strum::IntoEnumIterator;

#[derive(Debug, Serialize, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Serialize)]
struct TemplateInfo {
    name: &'static str,
    subjects: &'static [&'static str],
}

async fn generate_handler(
    State(state): State<AppState>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload?;
    let response = state.assembler.build_and_run(&request).await?;
    Ok(Json(GenerateResponse { response }))
}

async fn templates_handler() -> Json<Vec<TemplateInfo>> {
    Json(
        TaskTemplate::iter()
            .map(|template| TemplateInfo {
                name: template.into(),
                subjects: template.slots(),
            })
            .collect(),
    )
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/generate", post(generate_handler))
        .route("/templates", get(templates_handler))
        .with_state(state)
}
