//! Error handling - the single place failures become HTTP responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use board_core::error::{DomainError, RepoError};
use board_core::ports::AuthError;
use board_core::validation::Violations;
use board_shared::{FieldError, MessageResponse, ValidationErrorResponse};

/// Application-level error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation errors: {0}")]
    Validation(Violations),

    /// The request carried no usable token.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(AuthError),

    /// The caller is known but may not perform the operation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());

        match self {
            AppError::Validation(violations) => response.json(ValidationErrorResponse {
                errors: violations
                    .violations()
                    .iter()
                    .map(|v| FieldError::body(v.field, v.message.clone()))
                    .collect(),
            }),
            AppError::Unauthenticated(AuthError::MissingAuth) => {
                response.json(MessageResponse::new("No token, authorization denied"))
            }
            AppError::Unauthenticated(reason) => {
                tracing::debug!(%reason, "Token rejected");
                response.json(MessageResponse::new("Token is not valid"))
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                response.json(MessageResponse::server_error())
            }
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Conflict(msg) => response.json(MessageResponse::new(msg.clone())),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, .. } => {
                AppError::NotFound(format!("{entity_type} Not Found"))
            }
            DomainError::Validation(violations) => AppError::Validation(violations),
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::Unauthorized => AppError::Unauthorized("User Not Authorized".to_string()),
            DomainError::Internal(msg) => AppError::Internal(msg),
            DomainError::Repo(e) => e.into(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource Not Found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) => AppError::Internal(format!("database connection: {msg}")),
            RepoError::Query(msg) => AppError::Internal(format!("database query: {msg}")),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::Unauthorized("Invalid Credentials".to_string()),
            AuthError::HashingError(msg) => AppError::Internal(format!("password hashing: {msg}")),
            other => AppError::Unauthenticated(other),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use board_core::PostService;
    use board_core::domain::NewPost;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn test_not_found_message_names_entity() {
        let err: AppError = DomainError::not_found("Post", "abc").into();

        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({ "msg": "Post Not Found" }));
    }

    #[actix_web::test]
    async fn test_ownership_failure_is_401() {
        let (status, body) = body_json(DomainError::Unauthorized.into()).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["msg"], "User Not Authorized");
    }

    #[actix_web::test]
    async fn test_validation_lists_fields() {
        let violations = PostService::rules().validate(&NewPost::default());

        let (status, body) = body_json(DomainError::Validation(violations).into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["param"], "text");
        assert_eq!(body["errors"][0]["msg"], "Text is required");
        assert_eq!(body["errors"][0]["location"], "body");
    }

    #[actix_web::test]
    async fn test_store_failures_are_opaque() {
        let err: AppError = DomainError::Repo(RepoError::Connection("refused 10.0.0.5".into())).into();

        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "msg": "Server Error" }));
    }

    #[actix_web::test]
    async fn test_duplicate_is_409() {
        let err: AppError = DomainError::Duplicate("User already exists".to_string()).into();

        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, serde_json::json!({ "msg": "User already exists" }));
    }

    #[actix_web::test]
    async fn test_missing_token_message() {
        let (status, body) = body_json(AuthError::MissingAuth.into()).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["msg"], "No token, authorization denied");
    }
}
