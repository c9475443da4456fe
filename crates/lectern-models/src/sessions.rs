//! Persisted session records.
//!
//! A [`RefreshTokenRecord`] is created once per issued refresh token and is
//! never updated except for `revoked_at` moving from `None` to a timestamp.
//! Records sharing a `family` form one login lineage; at most one of them is
//! active at a time.
//!
//! A [`SessionRecord`] is a write-once audit row per issued access token. It
//! is never consulted to decide whether an access token is valid.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::ids::{FamilyId, RefreshTokenId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RefreshTokenRecord {
    pub id: RefreshTokenId,
    pub user_id: UserId,
    /// The signed token exactly as handed to the client.
    pub token: String,
    pub family: FamilyId,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Builds the record for a freshly minted, not yet revoked token.
    pub fn issue(
        user_id: UserId,
        token: String,
        family: FamilyId,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RefreshTokenId::new(),
            user_id,
            token,
            family,
            expires_at: now + ttl,
            revoked_at: None,
            created_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SessionRecord {
    pub user_id: UserId,
    pub token: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub expires_at: DateTime<Utc>,
}
