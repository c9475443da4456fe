use tracing::{info, instrument, warn};

use lectern_auth::ResourceScope;
use lectern_core::{AppError, permissions, verify_dummy_password, verify_password};
use lectern_models::{ActiveSession, LoginRequest, UserId};
use lectern_observability::{
    track_login_failure, track_refresh_denied, track_session_created, track_session_refreshed,
    track_sessions_revoked,
};
use lectern_session::{ClientInfo, RefreshOutcome, TokenPair};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthService;

impl AuthService {
    /// Checks the password and opens a new login family.
    #[instrument(skip_all, fields(email = %dto.email))]
    pub async fn login(
        state: &AppState,
        dto: LoginRequest,
        client: &ClientInfo,
    ) -> Result<TokenPair, AppError> {
        let Some(credentials) = state.users.find_credentials_by_email(&dto.email).await? else {
            verify_dummy_password(&dto.password)?;
            track_login_failure("unknown_email");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(&dto.password, &credentials.password_hash)? {
            track_login_failure("wrong_password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let pair = state
            .session_manager
            .create_session(&credentials.identity, client)
            .await?;
        track_session_created(pair.user.role.as_str());

        Ok(pair)
    }

    #[instrument(skip_all)]
    pub async fn refresh(
        state: &AppState,
        refresh_token: &str,
        client: &ClientInfo,
    ) -> Result<RefreshOutcome, AppError> {
        let outcome = state
            .session_manager
            .refresh_session(refresh_token, client)
            .await?;

        match &outcome {
            RefreshOutcome::Rotated(_) => track_session_refreshed(),
            RefreshOutcome::Denied(reason) => track_refresh_denied(reason.as_str()),
        }

        Ok(outcome)
    }

    /// Ends the family of the presented refresh token. A token that does not
    /// verify, or that belongs to someone else, revokes nothing.
    #[instrument(skip_all, fields(user_id = %user.user_id()))]
    pub async fn logout(
        state: &AppState,
        user: &AuthUser,
        refresh_token: Option<&str>,
    ) -> Result<u64, AppError> {
        let Some(claims) =
            refresh_token.and_then(|token| state.session_manager.codec().verify_refresh(token).ok())
        else {
            info!("Logout without a usable refresh token");
            return Ok(0);
        };

        if claims.payload.user_id != user.user_id() {
            warn!("Logout presented another user's refresh token");
            return Ok(0);
        }

        let revoked = state
            .session_manager
            .revoke_session(user.user_id(), Some(claims.family))
            .await?;
        track_sessions_revoked("family", revoked);

        Ok(revoked)
    }

    #[instrument(skip_all, fields(user_id = %user.user_id()))]
    pub async fn logout_all(state: &AppState, user: &AuthUser) -> Result<u64, AppError> {
        let revoked = state
            .session_manager
            .revoke_session(user.user_id(), None)
            .await?;
        track_sessions_revoked("user", revoked);

        Ok(revoked)
    }

    #[instrument(skip_all, fields(user_id = %user.user_id()))]
    pub async fn list_sessions(
        state: &AppState,
        user: &AuthUser,
    ) -> Result<Vec<ActiveSession>, AppError> {
        let records = state.session_manager.list_sessions(user.user_id()).await?;
        Ok(records.into_iter().map(ActiveSession::from).collect())
    }

    /// Revokes every family of `target`. The caller must be able to reach the
    /// target's organization; accounts outside any organization are only
    /// reachable by wildcard holders.
    #[instrument(skip_all, fields(admin_id = %admin.user_id(), target = %target))]
    pub async fn revoke_user_sessions(
        state: &AppState,
        admin: &AuthUser,
        target: UserId,
    ) -> Result<u64, AppError> {
        let user = state
            .users
            .find_user_by_id(target)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        let allowed = match user.organization_id {
            Some(org) => admin.can_access(&ResourceScope::in_organization(org)),
            None => admin.has_permission(permissions::ALL),
        };
        if !allowed {
            warn!("Session revocation outside the caller's organization");
            return Err(AppError::forbidden(
                "Cannot revoke sessions of a user outside your organization",
            ));
        }

        let revoked = state.session_manager.revoke_session(user.id, None).await?;
        track_sessions_revoked("user", revoked);

        Ok(revoked)
    }
}
