use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// Error body returned to clients.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Failure taxonomy shared by all role services.
///
/// `Unauthorized` and `InvalidCredentials` both answer 401; they stay
/// separate variants so login failures and missing-session failures keep
/// distinct messages and log lines.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    InvalidCredentials(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_logged_in() -> Self {
        ApiError::Unauthorized("not logged in".into())
    }

    pub fn invalid_credentials() -> Self {
        // Same message for unknown email and wrong password, so the
        // response does not leak which one differed.
        ApiError::InvalidCredentials("invalid credentials".into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) | ApiError::InvalidCredentials(_) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // The cause goes to the log, never to the client.
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// True when the underlying cause is a unique-constraint violation.
///
/// Repos wrap sqlx errors in `anyhow` context; this walks the chain so
/// services can turn an insert race into a `Conflict`.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .map_or(false, |db| db.kind() == sqlx::error::ErrorKind::UniqueViolation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            ApiError::not_logged_in().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::invalid_credentials().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound("event not found".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("already registered".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::BadRequest("invalid email".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn login_failures_share_one_message() {
        assert_eq!(
            ApiError::invalid_credentials().to_string(),
            "invalid credentials"
        );
    }

    #[test]
    fn unique_violation_check_ignores_other_errors() {
        let plain = anyhow::anyhow!("not a database error");
        assert!(!is_unique_violation(&plain));

        let wrapped: anyhow::Error = sqlx::Error::RowNotFound.into();
        assert!(!is_unique_violation(&wrapped));
    }

    #[test]
    fn error_body_serializes_as_error_field() {
        let body = serde_json::to_string(&ErrorBody {
            error: "not logged in".into(),
        })
        .unwrap();
        assert_eq!(body, r#"{"error":"not logged in"}"#);
    }
}
