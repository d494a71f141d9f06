use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use statutebook_core::CoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("regulation not found: {0}")]
    RegulationNotFound(u32),

    #[error("no articles provided")]
    EmptyPayload,

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Wire shape for failures: a stable kind for the frontend to branch on
/// plus a human-readable message naming the affected rows.
#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: &'static str,
    error: String,
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::Database(_)
            | ApiError::Migration(_)
            | ApiError::Core(CoreError::Persistence { .. }) => "persistence",
            ApiError::Core(CoreError::NotFound(_)) | ApiError::RegulationNotFound(_) => {
                "not_found"
            }
            ApiError::Core(_) | ApiError::EmptyPayload => "validation",
            ApiError::Config(_) => "configuration",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Database(_)
            | ApiError::Migration(_)
            | ApiError::Config(_)
            | ApiError::Core(CoreError::Persistence { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Core(CoreError::NotFound(_)) | ApiError::RegulationNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Core(_) | ApiError::EmptyPayload => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            kind: self.kind(),
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    use super::*;
    use statutebook_core::ArticleField;

    #[test]
    fn validation_failures_map_to_bad_request() {
        let overflow = ApiError::Core(CoreError::FieldOverflow {
            field: ArticleField::ChapterId,
            value: 100,
            max: 99,
        });
        assert_eq!(overflow.status(), StatusCode::BAD_REQUEST);
        assert_eq!(overflow.kind(), "validation");

        assert_eq!(ApiError::EmptyPayload.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_rows_map_to_not_found() {
        assert_eq!(
            ApiError::RegulationNotFound(7).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Core(CoreError::NotFound(Uuid::nil())).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn storage_failures_map_to_server_errors() {
        let err = ApiError::Core(CoreError::Persistence {
            affected: Some(Uuid::nil()),
            message: "connection reset".into(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), "persistence");
    }
}
