//! Application state - shared across all handlers.

use std::sync::Arc;

use inkwell_core::domain::User;
use inkwell_core::ports::{PostRepository, TokenService, UserRepository};
use inkwell_infra::auth::{JwtConfig, JwtTokenService};
use inkwell_infra::database::{DatabaseConfig, InMemoryPostRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
use inkwell_infra::database::{DatabaseConnections, PostgresPostRepository, PostgresUserRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenService>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// Without `DATABASE_URL` the store lives in memory. A configured
    /// database that cannot be reached is a startup error. `seed_user_email`
    /// names a user to ensure exists; a token for it is logged.
    pub async fn new(
        db_config: Option<&DatabaseConfig>,
        jwt_config: JwtConfig,
        seed_user_email: Option<&str>,
    ) -> std::io::Result<Self> {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(jwt_config));

        #[cfg(feature = "postgres")]
        if let Some(config) = db_config {
            let connections = DatabaseConnections::init(config).await.map_err(|e| {
                tracing::error!("Failed to connect to database: {}", e);
                std::io::Error::other(e)
            })?;

            tracing::info!("Application state initialized (postgres)");
            let state = Self {
                posts: Arc::new(PostgresPostRepository::new(connections.main.clone())),
                users: Arc::new(PostgresUserRepository::new(connections.main)),
                tokens,
            };
            if let Some(email) = seed_user_email {
                state.seed_user(email).await?;
            }
            return Ok(state);
        }

        #[cfg(not(feature = "postgres"))]
        if db_config.is_some() {
            tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
        }

        tracing::warn!("DATABASE_URL not set. Running in in-memory mode; data is not persisted.");
        let state = Self::in_memory(tokens);
        if let Some(email) = seed_user_email {
            state.seed_user(email).await?;
        }
        Ok(state)
    }

    /// Make sure a development user exists and log a token for it.
    ///
    /// An existing user with that email is reused, so restarts against the
    /// same database keep the user id stable.
    pub async fn seed_user(&self, email: &str) -> std::io::Result<User> {
        let existing = self
            .users
            .find_by_email(email)
            .await
            .map_err(std::io::Error::other)?;
        let user = match existing {
            Some(user) => user,
            None => self
                .users
                .save(User::new(email.to_string()))
                .await
                .map_err(std::io::Error::other)?,
        };
        let token = self
            .tokens
            .generate_token(user.id)
            .map_err(std::io::Error::other)?;

        tracing::info!(
            user_id = %user.id,
            email = %user.email,
            expires_in = self.tokens.expiration_seconds(),
            %token,
            "Seeded development user"
        );
        Ok(user)
    }

    /// State backed by fresh in-memory repositories.
    pub fn in_memory(tokens: Arc<dyn TokenService>) -> Self {
        Self {
            posts: Arc::new(InMemoryPostRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
            tokens,
        }
    }
}
