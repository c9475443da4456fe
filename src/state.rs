use std::sync::Arc;

use lectern_auth::TokenCodec;
use lectern_config::{CookieConfig, CorsConfig, JwtConfig, RateLimitConfig};
use lectern_db::{PgPool, PgRefreshTokenStore, PgSessionStore, PgUserDirectory};
use lectern_session::{SessionManager, UserDirectory};

#[derive(Clone)]
pub struct AppState {
    pub session_manager: SessionManager,
    pub users: Arc<dyn UserDirectory>,
    pub cookie_config: CookieConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("session_manager", &self.session_manager)
            .field("cookie_config", &self.cookie_config)
            .field("cors_config", &self.cors_config)
            .field("rate_limit_config", &self.rate_limit_config)
            .finish_non_exhaustive()
    }
}

/// Wires the Postgres-backed stores into a [`SessionManager`].
pub fn init_app_state(db: PgPool, jwt_config: &JwtConfig) -> AppState {
    let users: Arc<dyn UserDirectory> = Arc::new(PgUserDirectory::new(db.clone()));

    AppState {
        session_manager: SessionManager::new(
            TokenCodec::new(jwt_config),
            Arc::new(PgRefreshTokenStore::new(db.clone())),
            Arc::new(PgSessionStore::new(db)),
            users.clone(),
        ),
        users,
        cookie_config: CookieConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        rate_limit_config: RateLimitConfig::from_env(),
    }
}
