use crate::error::{ApiError, ErrorResponse};
use crate::models::CheeseResponse;
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

/// GET /cheeses handler - List every cheese in insertion order
#[utoipa::path(
    get,
    path = routes::CHEESE_LIST,
    responses(
        (status = 200, description = "All cheeses", body = [CheeseResponse]),
        (status = 500, description = "Store error", body = ErrorResponse)
    ),
    tag = "cheeses"
)]
pub async fn list_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<CheeseResponse>>), ApiError> {
    let cheeses = state.store.list().await?;
    let data: Vec<CheeseResponse> = cheeses.iter().map(CheeseResponse::from).collect();

    tracing::info!("Listed {} cheeses", data.len());
    Ok((StatusCode::OK, Json(data)))
}
