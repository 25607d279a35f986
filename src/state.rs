/// Shared application state, registered once as `web::Data<AppState>`.

use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::{PasswordHasher, SessionController};
use crate::configuration::{AuthSettings, JwtSettings};
use crate::store::{
    InMemoryPostStore, InMemoryRefreshTokenStore, InMemoryUserStore, PgPostStore,
    PgRefreshTokenStore, PgUserStore, PostStore, RefreshTokenStore, UserStore,
};

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionController>,
    pub posts: Arc<dyn PostStore>,
    pub jwt: JwtSettings,
    pub auth: AuthSettings,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        posts: Arc<dyn PostStore>,
        jwt: JwtSettings,
        auth: AuthSettings,
    ) -> Self {
        let sessions = SessionController::new(
            users,
            refresh_tokens,
            PasswordHasher::new(auth.bcrypt_cost),
            jwt.clone(),
        );

        Self {
            sessions: Arc::new(sessions),
            posts,
            jwt,
            auth,
        }
    }

    /// State backed by Postgres
    pub fn postgres(pool: PgPool, jwt: JwtSettings, auth: AuthSettings) -> Self {
        Self::new(
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgRefreshTokenStore::new(pool.clone())),
            Arc::new(PgPostStore::new(pool)),
            jwt,
            auth,
        )
    }

    /// State backed by process memory; nothing survives a restart
    pub fn in_memory(jwt: JwtSettings, auth: AuthSettings) -> Self {
        Self::new(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryRefreshTokenStore::new()),
            Arc::new(InMemoryPostStore::new()),
            jwt,
            auth,
        )
    }
}
