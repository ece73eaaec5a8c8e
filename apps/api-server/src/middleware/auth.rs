//! Identity extractor - verifies the request token before a handler runs.

use std::future::{Ready, ready};
use std::sync::Arc;

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use uuid::Uuid;

use board_core::ports::{AuthError, TokenClaims, TokenService};

use super::error::AppError;

/// Header carrying a bare token.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Authenticated caller.
///
/// Taking `Identity` as the first handler argument rejects unauthenticated
/// requests with 401 before the body is read:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
        }
    }
}

/// Token from `x-auth-token`, falling back to `Authorization: Bearer <token>`.
fn token_from(req: &HttpRequest) -> Result<&str, AuthError> {
    if let Some(value) = req.headers().get(AUTH_TOKEN_HEADER) {
        return value
            .to_str()
            .map(str::trim)
            .map_err(|_| AuthError::InvalidToken("Invalid token header".to_string()));
    }

    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Err(AuthError::MissingAuth);
    };

    value
        .to_str()
        .ok()
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(tokens) = req.app_data::<web::Data<Arc<dyn TokenService>>>() else {
            return ready(Err(AppError::Internal(
                "TokenService not found in app data".to_string(),
            )));
        };

        let result = token_from(req)
            .and_then(|token| {
                if token.is_empty() {
                    Err(AuthError::MissingAuth)
                } else {
                    tokens.validate_token(token)
                }
            })
            .map(Identity::from)
            .map_err(AppError::Unauthenticated);

        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_token_from_custom_header() {
        let req = TestRequest::default()
            .insert_header((AUTH_TOKEN_HEADER, "abc"))
            .to_http_request();

        assert_eq!(token_from(&req).unwrap(), "abc");
    }

    #[test]
    fn test_token_from_bearer() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer xyz"))
            .to_http_request();

        assert_eq!(token_from(&req).unwrap(), "xyz");
    }

    #[test]
    fn test_missing_token() {
        let req = TestRequest::default().to_http_request();

        assert!(matches!(token_from(&req), Err(AuthError::MissingAuth)));
    }

    #[test]
    fn test_non_bearer_scheme_rejected() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwdw=="))
            .to_http_request();

        assert!(matches!(token_from(&req), Err(AuthError::InvalidToken(_))));
    }
}
