use crate::db::models::DbCountry;
use crate::error::CountryError;
use crate::router::AppState;
use crate::types::country::{CountryInput, CountryListParams, MessageBody, RefreshSummary};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::info;

/// POST /countries/refresh -> pull both sources and rebuild the cache.
pub async fn refresh_countries(
    State(state): State<AppState>,
) -> Result<Json<RefreshSummary>, CountryError> {
    info!("Refresh requested");
    Ok(Json(state.refresh.refresh().await?))
}

/// GET /countries?region=&currency=&sort=
pub async fn list_countries(
    State(state): State<AppState>,
    Query(params): Query<CountryListParams>,
) -> Result<Json<Vec<DbCountry>>, CountryError> {
    let countries = state
        .query
        .list(&params.filter(), params.sort_key())
        .await?;
    Ok(Json(countries))
}

/// POST /countries -> validated create-or-replace by name.
pub async fn create_country(
    State(state): State<AppState>,
    payload: Result<Json<CountryInput>, JsonRejection>,
) -> Result<impl IntoResponse, CountryError> {
    let Json(input) = payload?;
    let valid = input.validate()?;
    let stored = state.refresh.save_country(valid).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /countries/{name}
pub async fn get_country(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DbCountry>, CountryError> {
    Ok(Json(state.query.get_by_name(&name).await?))
}

/// DELETE /countries/{name}
pub async fn delete_country(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageBody>, CountryError> {
    let removed = state.query.delete_by_name(&name).await?;
    Ok(Json(MessageBody {
        message: format!("Country '{removed}' deleted successfully"),
    }))
}

/// GET /countries/image -> last rendered summary PNG.
pub async fn summary_image(State(state): State<AppState>) -> Result<Response, CountryError> {
    let bytes = match tokio::fs::read(&state.image_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CountryError::ImageNotFound);
        }
        Err(e) => return Err(e.into()),
    };
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response())
}
