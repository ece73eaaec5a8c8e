//! Application state - shared across all handlers.

use std::sync::Arc;

use board_core::PostService;
use board_core::ports::{PasswordService, PostRepository, TokenService, UserRepository};
use board_infra::{
    Argon2PasswordService, InMemoryPostRepository, InMemoryUserRepository, JwtTokenService,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (posts, users) = Self::repositories(config).await;
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));

        tracing::info!("Application state initialized");

        Self::from_parts(posts, users, tokens)
    }

    /// Assemble state around already-built stores and token service.
    pub fn from_parts(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            posts: Arc::new(PostService::new(posts, users.clone())),
            users,
            tokens,
            passwords: Arc::new(Argon2PasswordService::new()),
        }
    }

    fn in_memory() -> (Arc<dyn PostRepository>, Arc<dyn UserRepository>) {
        let posts: Arc<dyn PostRepository> = Arc::new(InMemoryPostRepository::new());
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        (posts, users)
    }

    #[cfg(feature = "postgres")]
    async fn repositories(config: &AppConfig) -> (Arc<dyn PostRepository>, Arc<dyn UserRepository>) {
        use board_infra::DatabaseConnections;
        use board_infra::database::{PostgresPostRepository, PostgresUserRepository};

        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Self::in_memory();
        };

        match DatabaseConnections::init(db_config).await {
            Ok(connections) => {
                let posts: Arc<dyn PostRepository> =
                    Arc::new(PostgresPostRepository::new(connections.main.clone()));
                let users: Arc<dyn UserRepository> =
                    Arc::new(PostgresUserRepository::new(connections.main));
                (posts, users)
            }
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Self::in_memory()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(_config: &AppConfig) -> (Arc<dyn PostRepository>, Arc<dyn UserRepository>) {
        tracing::info!("Running without postgres feature - using in-memory store");
        Self::in_memory()
    }
}
