use crate::error::CountryError;
use crate::router::AppState;
use crate::types::country::StatusView;
use axum::{Json, extract::State};

/// GET /status -> total cached countries and last refresh time.
pub async fn get_status(State(state): State<AppState>) -> Result<Json<StatusView>, CountryError> {
    Ok(Json(state.query.status().await?))
}
