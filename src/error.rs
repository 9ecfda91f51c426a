use axum::{Json, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::Value;
use sqlx::Error as SqlxError;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error as ThisError;

/// External dependency a refresh pulls from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamSource {
    Countries,
    ExchangeRates,
}

impl UpstreamSource {
    pub fn host(&self) -> &'static str {
        match self {
            UpstreamSource::Countries => "restcountries.com",
            UpstreamSource::ExchangeRates => "open.er-api.com",
        }
    }
}

impl fmt::Display for UpstreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host())
    }
}

#[derive(Debug, ThisError)]
pub enum CountryError {
    #[error("Could not fetch data from {dependency}: {details}")]
    UpstreamUnavailable {
        dependency: UpstreamSource,
        details: String,
    },

    #[error("Country not found")]
    NotFound,

    #[error("Summary image not found")]
    ImageNotFound,

    #[error("Validation failed")]
    Validation(BTreeMap<String, String>),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("{0}")]
    Internal(String),
}

impl CountryError {
    pub fn upstream(dependency: UpstreamSource, err: impl fmt::Display) -> Self {
        CountryError::UpstreamUnavailable {
            dependency,
            details: err.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            CountryError::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            CountryError::NotFound | CountryError::ImageNotFound => StatusCode::NOT_FOUND,
            CountryError::Validation(_) => StatusCode::BAD_REQUEST,
            CountryError::DatabaseError(_)
            | CountryError::IoError(_)
            | CountryError::RenderError(_)
            | CountryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CountryError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let message = self.to_string();
        let body = match self {
            CountryError::UpstreamUnavailable { .. } => ApiErrorBody {
                error: "External data source unavailable".to_string(),
                details: Some(Value::String(message)),
            },
            CountryError::NotFound | CountryError::ImageNotFound => ApiErrorBody {
                error: message,
                details: None,
            },
            CountryError::Validation(fields) => ApiErrorBody {
                error: "Validation failed".to_string(),
                details: Some(serde_json::json!(fields)),
            },
            CountryError::DatabaseError(_)
            | CountryError::IoError(_)
            | CountryError::RenderError(_)
            | CountryError::Internal(_) => {
                tracing::error!(error = %message, "request failed");
                ApiErrorBody {
                    error: "Internal server error".to_string(),
                    details: Some(Value::String(message)),
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Malformed or mistyped request bodies are reported like any other validation failure.
impl From<JsonRejection> for CountryError {
    fn from(rejection: JsonRejection) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("body".to_string(), rejection.body_text());
        CountryError::Validation(fields)
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: CountryError) -> (StatusCode, Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn upstream_failure_names_the_source() {
        let (status, body) = body_json(CountryError::upstream(
            UpstreamSource::Countries,
            "operation timed out",
        ))
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "External data source unavailable");
        let details = body["details"].as_str().unwrap();
        assert!(details.contains("restcountries.com"));
        assert!(details.contains("operation timed out"));
    }

    #[tokio::test]
    async fn not_found_has_no_details() {
        let (status, body) = body_json(CountryError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({"error": "Country not found"}));
    }

    #[tokio::test]
    async fn validation_lists_fields() {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), "is required".to_string());
        let (status, body) = body_json(CountryError::Validation(fields)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["details"]["name"], "is required");
    }

    #[tokio::test]
    async fn internal_errors_are_generic() {
        let (status, body) = body_json(CountryError::Internal("boom".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["details"], "boom");
    }
}
