//! Request and response bodies for the `/api/auth` endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{FamilyId, RefreshTokenId};
use crate::sessions::RefreshTokenRecord;
use crate::users::UserIdentity;

/// Login request with email and password.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    #[schema(example = "teacher@school.example")]
    pub email: String,
    #[validate(length(min = 1))]
    #[schema(example = "password123")]
    pub password: String,
}

/// Refresh request. The token may instead arrive in the `refresh_token`
/// cookie, in which case the body can be empty.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1))]
    pub refresh_token: Option<String>,
}

/// Logout request. Identifies the device lineage to end; falls back to the
/// `refresh_token` cookie.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct LogoutRequest {
    #[validate(length(min = 1))]
    pub refresh_token: Option<String>,
}

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserIdentity,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserIdentity,
    pub permissions: Vec<String>,
}

/// One live login lineage of the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActiveSession {
    pub id: RefreshTokenId,
    pub family: FamilyId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<RefreshTokenRecord> for ActiveSession {
    fn from(record: RefreshTokenRecord) -> Self {
        Self {
            id: record.id,
            family: record.family,
            created_at: record.created_at,
            expires_at: record.expires_at,
        }
    }
}

/// Generic success message response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let valid = LoginRequest {
            email: "teacher@school.example".to_string(),
            password: "secret".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = LoginRequest {
            email: "not-an-email".to_string(),
            password: String::new(),
        };
        let errors = invalid.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_refresh_request_body_is_optional() {
        let request: RefreshTokenRequest = serde_json::from_str("{}").unwrap();
        assert!(request.refresh_token.is_none());
        assert!(request.validate().is_ok());

        let empty: RefreshTokenRequest =
            serde_json::from_str(r#"{"refresh_token":""}"#).unwrap();
        assert!(empty.validate().is_err());
    }
}
