use utoipa::OpenApi;

use crate::error::{ErrorResponse, HealthResponse, UnhealthyResponse};
use crate::handlers;
use crate::models::CheeseResponse;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "cheese-routes API",
        version = "1.0.0",
        description = "Read-only cheese catalogue demonstrating dynamic route parameters"
    ),
    paths(
        handlers::health::health_handler,
        handlers::list::list_handler,
        handlers::get::get_handler
    ),
    components(
        schemas(
            CheeseResponse,
            ErrorResponse,
            HealthResponse,
            UnhealthyResponse
        )
    ),
    tags(
        (name = "health", description = "Health check operations"),
        (name = "cheeses", description = "Cheese catalogue")
    )
)]
pub struct ApiDoc;
