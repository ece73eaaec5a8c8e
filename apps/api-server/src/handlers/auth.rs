//! Registration, login, and the caller's own profile.

use actix_web::{HttpResponse, web};

use board_core::DomainError;
use board_core::domain::User;
use board_core::error::RepoError;
use board_core::validation::{Validator, not_blank};
use board_shared::dto::{AuthResponse, LoginRequest, RegisterUserRequest, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn registration_rules() -> Validator<RegisterUserRequest> {
    Validator::<RegisterUserRequest>::new()
        .rule("name", "Name is required", |r| not_blank(&r.name))
        .rule("email", "Please include a valid email", |r| {
            r.email.contains('@')
        })
        .rule(
            "password",
            "Please enter a password with 8 or more characters",
            |r| r.password.chars().count() >= 8,
        )
}

fn token_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let token = state.tokens.generate_token(user.id, &user.email)?;

    Ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
    })
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let violations = registration_rules().validate(&req);
    if violations.has_violations() {
        return Err(AppError::Validation(violations));
    }

    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(DomainError::Duplicate("User already exists".to_string()).into());
    }

    let password_hash = state.passwords.hash(&req.password)?;
    let user = User::new(
        req.name.trim().to_string(),
        req.email,
        req.avatar.unwrap_or_default(),
        password_hash,
    );
    let saved = state.users.create(user).await.map_err(|e| match e {
        // Lost a race with a concurrent registration for the same email.
        RepoError::Constraint(_) => DomainError::Duplicate("User already exists".to_string()),
        other => other.into(),
    })?;
    tracing::info!(user_id = %saved.id, "User registered");

    Ok(HttpResponse::Created().json(token_response(&state, &saved)?))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid Credentials".to_string()))?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid Credentials".to_string()));
    }

    Ok(HttpResponse::Ok().json(token_response(&state, &user)?))
}

/// GET /api/auth/me
pub async fn me(identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User Not Found".to_string()))?;

    Ok(HttpResponse::Ok().json(UserResponse {
        id: user.id.to_string(),
        name: user.name,
        email: user.email,
        avatar: user.avatar,
        created_at: user.created_at.to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::http::header::ContentType;
    use actix_web::test::{TestRequest, call_service, read_body_json};
    use serde_json::{Value, json};

    use super::registration_rules;
    use crate::handlers::test_support::TestContext;
    use board_shared::dto::RegisterUserRequest;

    #[test]
    fn test_registration_rules_collect_every_field() {
        let violations = registration_rules().validate(&RegisterUserRequest {
            name: " ".to_string(),
            email: "nope".to_string(),
            password: "short".to_string(),
            avatar: None,
        });

        let fields: Vec<&str> = violations.violations().iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["name", "email", "password"]);
    }

    #[actix_web::test]
    async fn test_register_login_me() {
        let ctx = TestContext::new();
        let app = test_app!(ctx.state);

        let resp = call_service(
            &app,
            TestRequest::post()
                .uri("/api/auth/register")
                .set_json(json!({
                    "name": "Ada",
                    "email": "ada@example.com",
                    "password": "analytical-engine",
                    "avatar": "//gravatar/ada"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let registered: Value = read_body_json(resp).await;
        assert_eq!(registered["token_type"], "Bearer");

        let resp = call_service(
            &app,
            TestRequest::post()
                .uri("/api/auth/login")
                .set_json(json!({ "email": "ada@example.com", "password": "analytical-engine" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let login: Value = read_body_json(resp).await;
        let token = login["access_token"].as_str().unwrap();

        let resp = call_service(
            &app,
            TestRequest::get()
                .uri("/api/auth/me")
                .insert_header(("x-auth-token", token))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let me: Value = read_body_json(resp).await;
        assert_eq!(me["name"], "Ada");
        assert_eq!(me["avatar"], "//gravatar/ada");
    }

    #[actix_web::test]
    async fn test_register_reports_all_violations() {
        let ctx = TestContext::new();
        let app = test_app!(ctx.state);

        let resp = call_service(
            &app,
            TestRequest::post()
                .uri("/api/auth/register")
                .set_json(json!({}))
                .to_request(),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["errors"].as_array().unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn test_register_duplicate_email_conflicts() {
        let ctx = TestContext::new();
        ctx.user("Ada").await;
        let app = test_app!(ctx.state);

        let resp = call_service(
            &app,
            TestRequest::post()
                .uri("/api/auth/register")
                .set_json(json!({
                    "name": "Ada Again",
                    "email": "ada@example.com",
                    "password": "long-enough-password"
                }))
                .to_request(),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body, json!({ "msg": "User already exists" }));
    }

    #[actix_web::test]
    async fn test_login_unknown_email_is_401() {
        let ctx = TestContext::new();
        let app = test_app!(ctx.state);

        let resp = call_service(
            &app,
            TestRequest::post()
                .uri("/api/auth/login")
                .set_json(json!({ "email": "nobody@example.com", "password": "whatever123" }))
                .to_request(),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body, json!({ "msg": "Invalid Credentials" }));
    }

    #[actix_web::test]
    async fn test_unreadable_login_body_hides_parser_detail() {
        let ctx = TestContext::new();
        let app = test_app!(ctx.state);

        let resp = call_service(
            &app,
            TestRequest::post()
                .uri("/api/auth/login")
                .insert_header(ContentType::json())
                .set_payload("{\"email\": null")
                .to_request(),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body, json!({ "msg": "Invalid request body" }));
    }

    #[actix_web::test]
    async fn test_health_is_public() {
        let ctx = TestContext::new();
        let app = test_app!(ctx.state);

        let resp = call_service(&app, TestRequest::get().uri("/api/health").to_request()).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
    }
}
