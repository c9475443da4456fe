use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;
use utoipa::ToSchema;

use lectern_auth::permissions_for;
use lectern_core::AppError;
use lectern_models::{
    ActiveSession, LoginRequest, LogoutRequest, MessageResponse, ProfileResponse,
    RefreshTokenRequest, TokenResponse, UserId,
};
use lectern_session::{RefreshOutcome, TokenPair};

use super::service::AuthService;
use crate::middleware::auth::{AuthUser, RequireSessionsRevoke};
use crate::middleware::client::Client;
use crate::state::AppState;
use crate::utils::cookies::{REFRESH_TOKEN_COOKIE, clear_session_cookies, set_session_cookies};
use crate::validator::ValidatedJson;

pub const SESSION_EXPIRED: &str = "Session expired, please log in again";

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Sets both session cookies and renders the pair.
fn issue(state: &AppState, jar: CookieJar, pair: TokenPair) -> (CookieJar, Json<TokenResponse>) {
    let codec = state.session_manager.codec();
    let jar = set_session_cookies(
        jar,
        &pair.access_token,
        &pair.refresh_token,
        codec.access_ttl(),
        codec.refresh_ttl(),
        &state.cookie_config,
    );

    let body = TokenResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: codec.access_ttl().num_seconds(),
        user: pair.user,
    };

    (jar, Json(body))
}

fn presented_refresh_token(body: Option<String>, jar: &CookieJar) -> Option<String> {
    body.or_else(|| jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string()))
}

/// Login and receive a session
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookies set", body = TokenResponse),
        (status = 400, description = "Bad request - malformed body", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 429, description = "Too many requests"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Client(client): Client,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let pair = AuthService::login(&state, dto, &client).await?;
    Ok(issue(&state, jar, pair))
}

/// Exchange a refresh token for a new pair
///
/// The token is read from the body or, when absent, the `refresh_token`
/// cookie. Each refresh token is accepted once; presenting a used token ends
/// its whole login.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body(content = RefreshTokenRequest, description = "Optional when the refresh_token cookie is sent"),
    responses(
        (status = 200, description = "Session rotated, session cookies set", body = TokenResponse),
        (status = 401, description = "Refresh denied, session cookies cleared", body = ErrorResponse),
        (status = 429, description = "Too many requests"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    Client(client): Client,
    jar: CookieJar,
    body: Option<ValidatedJson<RefreshTokenRequest>>,
) -> Result<Response, AppError> {
    let token = presented_refresh_token(
        body.and_then(|ValidatedJson(dto)| dto.refresh_token),
        &jar,
    )
    .ok_or_else(|| AppError::unauthorized("Missing refresh token"))?;

    match AuthService::refresh(&state, &token, &client).await? {
        RefreshOutcome::Rotated(pair) => Ok(issue(&state, jar, pair).into_response()),
        RefreshOutcome::Denied(_) => Ok((
            clear_session_cookies(jar, &state.cookie_config),
            AppError::unauthorized(SESSION_EXPIRED),
        )
            .into_response()),
    }
}

/// Log out of the current device
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    request_body(content = LogoutRequest, description = "Optional when the refresh_token cookie is sent"),
    responses(
        (status = 200, description = "Logged out, session cookies cleared", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
    jar: CookieJar,
    body: Option<ValidatedJson<LogoutRequest>>,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    let token = presented_refresh_token(
        body.and_then(|ValidatedJson(dto)| dto.refresh_token),
        &jar,
    );
    AuthService::logout(&state, &auth_user, token.as_deref()).await?;

    Ok((
        clear_session_cookies(jar, &state.cookie_config),
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    ))
}

/// Log out of every device
#[utoipa::path(
    post,
    path = "/api/auth/logout-all",
    responses(
        (status = 200, description = "All sessions revoked, session cookies cleared", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn logout_all(
    State(state): State<AppState>,
    auth_user: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    let revoked = AuthService::logout_all(&state, &auth_user).await?;

    Ok((
        clear_session_cookies(jar, &state.cookie_config),
        Json(MessageResponse {
            message: format!("Logged out from all devices ({revoked} sessions revoked)"),
        }),
    ))
}

/// Get the current user's identity and permissions
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Authenticated identity", body = ProfileResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn get_me(AuthUser(payload): AuthUser) -> Json<ProfileResponse> {
    let permissions = permissions_for(payload.role)
        .iter()
        .map(|p| p.to_string())
        .collect();

    Json(ProfileResponse {
        user: payload.into(),
        permissions,
    })
}

/// List the current user's active sessions
#[utoipa::path(
    get,
    path = "/api/auth/sessions",
    responses(
        (status = 200, description = "One entry per logged-in device", body = Vec<ActiveSession>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn get_sessions(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<ActiveSession>>, AppError> {
    let sessions = AuthService::list_sessions(&state, &auth_user).await?;
    Ok(Json(sessions))
}

/// Revoke every session of another user
#[utoipa::path(
    post,
    path = "/api/auth/users/{user_id}/revoke-sessions",
    params(
        ("user_id" = String, Path, description = "Target user ID")
    ),
    responses(
        (status = 200, description = "Sessions revoked", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Missing permission or outside organization", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn revoke_user_sessions(
    State(state): State<AppState>,
    RequireSessionsRevoke(admin): RequireSessionsRevoke,
    Path(user_id): Path<UserId>,
) -> Result<Json<MessageResponse>, AppError> {
    let revoked = AuthService::revoke_user_sessions(&state, &admin, user_id).await?;

    Ok(Json(MessageResponse {
        message: format!("Revoked {revoked} sessions"),
    }))
}
