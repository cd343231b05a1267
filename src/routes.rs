use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::error::ApiError;
use crate::handlers;
use crate::state::AppState;

// Route path constants - single source of truth for all API paths
pub const HEALTH: &str = "/health";
pub const CHEESE_LIST: &str = "/cheeses";
pub const CHEESE_ITEM: &str = "/cheeses/{id}";
pub const SWAGGER_UI: &str = "/swagger-ui";
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";

/// Build the application router with all routes and middleware attached
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH, get(handlers::health_handler))
        .route(CHEESE_LIST, get(handlers::list_handler))
        .route(CHEESE_ITEM, get(handlers::get_handler))
        .with_state(state)
        .merge(SwaggerUi::new(SWAGGER_UI).url(OPENAPI_JSON, ApiDoc::openapi()))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
}

/// Unmatched paths get the same JSON 404 as a missing cheese
async fn not_found() -> ApiError {
    ApiError::NotFound
}
