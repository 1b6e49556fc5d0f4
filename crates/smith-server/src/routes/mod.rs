// Export route modules
pub mod claude;
pub mod compile;
pub mod generate;

use crate::state::AppState;
use axum::Router;

// Function to configure all routes
pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(generate::routes(state.clone()))
        .merge(claude::routes(state.clone()))
        .merge(compile::routes(state))
}
