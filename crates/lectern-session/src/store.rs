//! Persistence seams consumed by the session manager.
//!
//! Implementations must make [`RefreshTokenStore::revoke_if_active`] a single
//! atomic conditional update: of two concurrent calls for the same token,
//! exactly one may observe `true`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use lectern_models::{FamilyId, RefreshTokenRecord, SessionRecord, UserId, UserIdentity};

use crate::error::StoreError;

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), StoreError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Sets `revoked_at = at` where the token matches and is not yet revoked.
    /// Returns whether a record was affected.
    async fn revoke_if_active(&self, token: &str, at: DateTime<Utc>) -> Result<bool, StoreError>;

    /// Revokes every active record of `family` owned by `user_id`.
    async fn revoke_all_by_family(
        &self,
        user_id: UserId,
        family: FamilyId,
        at: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    /// Revokes every active record owned by `user_id`, across all families.
    async fn revoke_all_by_user(&self, user_id: UserId, at: DateTime<Utc>)
    -> Result<u64, StoreError>;

    /// Records that are neither revoked nor expired at `now`.
    async fn list_active_by_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshTokenRecord>, StoreError>;

    /// Deletes records that are both revoked and expired at `now`.
    async fn delete_expired_revoked(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Revokes `old_token` if still active and, only then, stores `next`.
    ///
    /// The default composes [`revoke_if_active`](Self::revoke_if_active) and
    /// [`insert`](Self::insert). Stores that can do both in one transaction
    /// should, so a concurrent family revocation cannot slip between them.
    async fn rotate(
        &self,
        old_token: &str,
        next: &RefreshTokenRecord,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        if !self.revoke_if_active(old_token, at).await? {
            return Ok(false);
        }
        self.insert(next).await?;
        Ok(true)
    }
}

/// Write-only audit log of issued access tokens.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, record: &SessionRecord) -> Result<(), StoreError>;
}

/// A user together with their stored password hash.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub identity: UserIdentity,
    pub password_hash: String,
}

/// The user directory owned by the surrounding application.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<UserIdentity>, StoreError>;

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, StoreError>;

    async fn touch_last_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), StoreError>;
}
