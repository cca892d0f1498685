use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Every fallible operation in the crate reports one of these; callers
/// branch on the variant, never on a status string.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("authentication required")]
    Unauthorized,

    #[error("you do not own this resource")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("password too short or confirmation mismatch")]
    WeakPassword,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("recipe already liked")]
    AlreadyLiked,

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("search query is empty")]
    EmptyQuery,

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound | AppError::UnknownCategory(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateEmail | AppError::AlreadyLiked => StatusCode::CONFLICT,
            AppError::InvalidEmail | AppError::WeakPassword | AppError::EmptyQuery => {
                StatusCode::BAD_REQUEST
            }
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Persistence details stay in the logs, not in the response body.
        let body = match &self {
            AppError::Storage(e) => {
                error!(error = %e, "storage error");
                "storage error".to_string()
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                "internal error".to_string()
            }
            other => other.to_string(),
        };

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            AppError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::DuplicateEmail.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::AlreadyLiked.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::UnknownCategory("nope".into())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::EmptyQuery.into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn storage_error_body_is_generic() {
        let err = AppError::Storage(sqlx::Error::RowNotFound);
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
