use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use lectern_models::{
    ActiveSession, LoginRequest, LogoutRequest, MessageResponse, ProfileResponse,
    RefreshTokenRequest, Role, TokenResponse, UserIdentity,
};

use crate::modules::auth::controller::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::refresh,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::logout_all,
        crate::modules::auth::controller::get_me,
        crate::modules::auth::controller::get_sessions,
        crate::modules::auth::controller::revoke_user_sessions,
    ),
    components(
        schemas(
            LoginRequest,
            RefreshTokenRequest,
            LogoutRequest,
            TokenResponse,
            ProfileResponse,
            ActiveSession,
            MessageResponse,
            UserIdentity,
            Role,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login, refresh-token rotation and logout")
    ),
    info(
        title = "Lectern API",
        version = "0.1.0",
        description = "Session service with single-use refresh tokens and family-based reuse detection.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
