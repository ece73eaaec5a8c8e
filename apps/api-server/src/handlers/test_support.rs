//! Shared fixtures for handler tests: an in-memory app with a real JWT verifier.

use std::sync::Arc;

use board_core::domain::User;
use board_core::ports::{BaseRepository, TokenService};
use board_infra::{
    InMemoryPostRepository, InMemoryUserRepository, JwtConfig, JwtTokenService,
};

use crate::state::AppState;

/// Build and initialize the full route table around `$state`.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state.clone()))
                .app_data(actix_web::web::Data::new($state.tokens.clone()))
                .app_data(crate::handlers::json_config())
                .configure(crate::handlers::configure_routes),
        )
        .await
    };
}

pub struct TestContext {
    pub state: AppState,
    pub users: Arc<InMemoryUserRepository>,
    pub posts: Arc<InMemoryPostRepository>,
}

impl TestContext {
    pub fn new() -> Self {
        let posts = Arc::new(InMemoryPostRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "handler-test-secret".to_string(),
            expiration_hours: 1,
            issuer: "board-test".to_string(),
        }));

        let state = AppState::from_parts(posts.clone(), users.clone(), tokens);
        Self {
            state,
            users,
            posts,
        }
    }

    /// Store a user and return it with a valid token.
    pub async fn user(&self, name: &str) -> (User, String) {
        let user = User::new(
            name.to_string(),
            format!("{}@example.com", name.to_lowercase()),
            format!("//gravatar/{name}"),
            "unused".to_string(),
        );
        let user = self.users.create(user).await.unwrap();
        let token = self.token_for(&user);
        (user, token)
    }

    pub fn token_for(&self, user: &User) -> String {
        self.state
            .tokens
            .generate_token(user.id, &user.email)
            .unwrap()
    }
}
