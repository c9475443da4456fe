use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_governor::GovernorLayer;

use lectern_config::RateLimitConfig;

use super::controller::{
    get_me, get_sessions, login, logout, logout_all, refresh, revoke_user_sessions,
};
use crate::state::AppState;

/// Login and refresh are reachable without a session, so they alone sit
/// behind the per-client rate limiter.
pub fn init_auth_router(rate_limit: &RateLimitConfig) -> Router<AppState> {
    let public = Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh));

    let public = if rate_limit.enabled {
        public.layer(GovernorLayer::new(Arc::new(rate_limit.auth_governor_config())))
    } else {
        public
    };

    Router::new()
        .merge(public)
        .route("/logout", post(logout))
        .route("/logout-all", post(logout_all))
        .route("/me", get(get_me))
        .route("/sessions", get(get_sessions))
        .route("/users/{user_id}/revoke-sessions", post(revoke_user_sessions))
}
