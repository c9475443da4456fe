//! JWT claim structures.
//!
//! Both token classes embed the same [`TokenPayload`]. The `typ` claim
//! records the class so a token can never be accepted as the other kind,
//! even if it were signed with the wrong secret.

use serde::{Deserialize, Serialize};

use lectern_models::{FamilyId, OrganizationId, Role, UserId, UserIdentity};

/// Identity embedded in every token. Immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// User ID (subject claim)
    #[serde(rename = "sub")]
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    /// Organization scope (None for system admins)
    #[serde(rename = "org")]
    pub organization_id: Option<OrganizationId>,
}

impl From<UserIdentity> for TokenPayload {
    fn from(user: UserIdentity) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
            role: user.role,
            organization_id: user.organization_id,
        }
    }
}

impl From<TokenPayload> for UserIdentity {
    fn from(payload: TokenPayload) -> Self {
        Self {
            id: payload.user_id,
            email: payload.email,
            role: payload.role,
            organization_id: payload.organization_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Implemented by the claim structures so verification can check the class.
pub trait TypedClaims {
    const KIND: TokenKind;

    fn kind(&self) -> TokenKind;
}

/// Claims of a short-lived access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    #[serde(flatten)]
    pub payload: TokenPayload,
    /// Unique token identifier (JWT ID)
    pub jti: String,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    pub typ: TokenKind,
}

impl TypedClaims for AccessClaims {
    const KIND: TokenKind = TokenKind::Access;

    fn kind(&self) -> TokenKind {
        self.typ
    }
}

/// Claims of a long-lived refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    #[serde(flatten)]
    pub payload: TokenPayload,
    /// Login lineage this token belongs to. Unchanged across rotations.
    pub family: FamilyId,
    pub jti: String,
    pub iat: usize,
    pub exp: usize,
    pub typ: TokenKind,
}

impl TypedClaims for RefreshClaims {
    const KIND: TokenKind = TokenKind::Refresh;

    fn kind(&self) -> TokenKind {
        self.typ
    }
}
