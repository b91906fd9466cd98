use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Recommendation computation failed: {details}")]
    ComputationFailed { details: String },

    #[error("Failed to parse recommendation output")]
    MalformedResult { raw: String },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            // The diagnostic stream is surfaced verbatim so operators can see
            // what the recommender printed before dying.
            AppError::ComputationFailed { details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Recommendation computation failed", "details": details }),
            ),
            AppError::MalformedResult { raw } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to parse recommendation output", "result": raw }),
            ),
            AppError::Database(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": self.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (AppError::NotFound("user".into()), StatusCode::NOT_FOUND),
            (
                AppError::InvalidInput("rating".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Unauthorized("bad token".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::ComputationFailed {
                    details: "model unavailable".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::MalformedResult {
                    raw: "not json".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
