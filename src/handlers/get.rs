use crate::error::{ApiError, ErrorResponse};
use crate::models::CheeseResponse;
use crate::routes;
use crate::state::AppState;
use axum::{extract::rejection::PathRejection, extract::State, extract::Path, http::StatusCode, Json};

/// Parse a path segment into a cheese id.
///
/// Anything that is not an `i64` can never match a record, so it is
/// reported as `NotFound` rather than as a bad request.
pub fn parse_cheese_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::NotFound)
}

/// GET /cheeses/{id} handler - Retrieve a single cheese
#[utoipa::path(
    get,
    path = routes::CHEESE_ITEM,
    params(
        ("id" = String, Path, description = "Integer id of the cheese")
    ),
    responses(
        (status = 200, description = "Cheese found", body = CheeseResponse),
        (status = 404, description = "No cheese with this id", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "cheeses"
)]
pub async fn get_handler(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<(StatusCode, Json<CheeseResponse>), ApiError> {
    // A segment that can't even be decoded can't name a cheese either
    let Path(id_str) = path.map_err(|rejection| {
        tracing::info!("Undecodable cheese id: {}", rejection.body_text());
        ApiError::NotFound
    })?;
    let id = parse_cheese_id(&id_str).inspect_err(|_| {
        tracing::info!("Non-numeric cheese id: {:?}", id_str);
    })?;

    match state.store.find_by_id(id).await? {
        Some(cheese) => {
            tracing::info!("Successfully retrieved cheese with id: {}", id);
            Ok((StatusCode::OK, Json(CheeseResponse::from(&cheese))))
        }
        None => {
            tracing::info!("Cheese not found with id: {}", id);
            Err(ApiError::NotFound)
        }
    }
}
