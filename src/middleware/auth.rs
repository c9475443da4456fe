use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;

use lectern_auth::{ResourceScope, TokenPayload, can_access_resource, has_permission};
use lectern_core::AppError;
use lectern_models::UserId;

use crate::state::AppState;
use crate::utils::cookies::ACCESS_TOKEN_COOKIE;

/// The caller, authenticated by a valid access token taken from the
/// `Authorization: Bearer` header or, failing that, the `access_token`
/// cookie.
#[derive(Debug, Clone)]
pub struct AuthUser(pub TokenPayload);

impl AuthUser {
    pub fn user_id(&self) -> UserId {
        self.0.user_id
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        has_permission(&self.0, permission)
    }

    pub fn can_access(&self, resource: &ResourceScope) -> bool {
        can_access_resource(&self.0, resource)
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(Some)
        .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = match bearer_token(parts)? {
            Some(token) => token.to_string(),
            None => CookieJar::from_headers(&parts.headers)
                .get(ACCESS_TOKEN_COOKIE)
                .map(|c| c.value().to_string())
                .ok_or_else(|| AppError::unauthorized("Missing access token"))?,
        };

        let claims = state
            .session_manager
            .codec()
            .verify_access(&token)
            .map_err(|_| AppError::unauthorized("Invalid or expired token"))?;

        Ok(AuthUser(claims.payload))
    }
}

/// Declares an extractor that authenticates the caller and rejects with 403
/// unless their role grants `$permission`.
#[macro_export]
macro_rules! require_permission {
    ($name:ident, $permission:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = lectern_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user = <$crate::middleware::auth::AuthUser as axum::extract::FromRequestParts<
                    $crate::state::AppState,
                >>::from_request_parts(parts, state)
                .await?;

                let allowed = auth_user.has_permission($permission);
                lectern_observability::track_authorization_check(allowed, auth_user.0.role.as_str());

                if !allowed {
                    return Err(lectern_core::AppError::forbidden(format!(
                        "Access denied. Missing required permission: {}",
                        $permission
                    )));
                }

                Ok($name(auth_user))
            }
        }
    };
}

require_permission!(RequireSessionsRevoke, lectern_core::permissions::SESSIONS_REVOKE);
