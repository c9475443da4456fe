//! Login, refresh-token rotation and logout.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{Span, error, info, instrument, warn};

use lectern_auth::{TokenCodec, TokenPayload};
use lectern_models::{FamilyId, RefreshTokenRecord, SessionRecord, UserId, UserIdentity};

use crate::error::{SessionError, StoreError};
use crate::store::{RefreshTokenStore, SessionStore, UserDirectory};

/// Client metadata stored alongside each issued access token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// A freshly issued access/refresh pair.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub family: FamilyId,
    pub user: UserIdentity,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("family", &self.family)
            .field("user", &self.user.id)
            .finish_non_exhaustive()
    }
}

/// Why a refresh was refused. Every variant means "log in again".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// Malformed, wrongly signed, wrong class or expired.
    InvalidToken,
    /// Well-formed but no record exists for it.
    UnknownToken,
    /// The record was already revoked; its family has now been revoked.
    ReuseDetected,
    /// A concurrent refresh consumed the token first; the family has been
    /// revoked.
    RaceLost,
    /// The token's owner no longer exists; the family has been revoked.
    UserNotFound,
}

impl DenialReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DenialReason::InvalidToken => "invalid_token",
            DenialReason::UnknownToken => "unknown_token",
            DenialReason::ReuseDetected => "reuse_detected",
            DenialReason::RaceLost => "race_lost",
            DenialReason::UserNotFound => "user_not_found",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum RefreshOutcome {
    Rotated(TokenPair),
    Denied(DenialReason),
}

impl RefreshOutcome {
    pub fn is_rotated(&self) -> bool {
        matches!(self, RefreshOutcome::Rotated(_))
    }
}

#[derive(Clone)]
pub struct SessionManager {
    codec: TokenCodec,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    sessions: Arc<dyn SessionStore>,
    users: Arc<dyn UserDirectory>,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(
        codec: TokenCodec,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        sessions: Arc<dyn SessionStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            codec,
            refresh_tokens,
            sessions,
            users,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// The refresh-token store, shared with the housekeeping sweeper.
    pub fn refresh_tokens(&self) -> Arc<dyn RefreshTokenStore> {
        self.refresh_tokens.clone()
    }

    /// Starts a new login lineage for an already authenticated user.
    #[instrument(skip_all, fields(user_id = %user.id, family))]
    pub async fn create_session(
        &self,
        user: &UserIdentity,
        client: &ClientInfo,
    ) -> Result<TokenPair, SessionError> {
        let family = FamilyId::new();
        Span::current().record("family", tracing::field::display(family));

        let now = Utc::now();
        let pair = self.issue_pair(user.clone(), family)?;

        self.refresh_tokens
            .insert(&self.refresh_record(&pair, now))
            .await
            .inspect_err(log_store_error)?;
        self.record_access(&pair, client, now).await?;
        self.users
            .touch_last_login(user.id, now)
            .await
            .inspect_err(log_store_error)?;

        info!("Session created");
        Ok(pair)
    }

    /// Exchanges a refresh token for a new pair in the same family.
    ///
    /// A token is accepted at most once. Presenting a consumed token, or
    /// losing a concurrent rotation of it, revokes the entire family.
    #[instrument(skip_all, fields(user_id, family))]
    pub async fn refresh_session(
        &self,
        refresh_token: &str,
        client: &ClientInfo,
    ) -> Result<RefreshOutcome, SessionError> {
        let Ok(claims) = self.codec.verify_refresh(refresh_token) else {
            info!("Refresh denied: invalid token");
            return Ok(RefreshOutcome::Denied(DenialReason::InvalidToken));
        };

        let span = Span::current();
        span.record("user_id", tracing::field::display(claims.payload.user_id));
        span.record("family", tracing::field::display(claims.family));

        let Some(record) = self
            .refresh_tokens
            .find_by_token(refresh_token)
            .await
            .inspect_err(log_store_error)?
        else {
            info!("Refresh denied: no record for token");
            return Ok(RefreshOutcome::Denied(DenialReason::UnknownToken));
        };

        if !record.is_active() {
            warn!("Refresh token reuse detected, revoking family");
            self.revoke_family(&record).await?;
            return Ok(RefreshOutcome::Denied(DenialReason::ReuseDetected));
        }

        let Some(user) = self
            .users
            .find_user_by_id(record.user_id)
            .await
            .inspect_err(log_store_error)?
        else {
            warn!("Refresh token owner no longer exists, revoking family");
            self.revoke_family(&record).await?;
            return Ok(RefreshOutcome::Denied(DenialReason::UserNotFound));
        };

        let now = Utc::now();
        let pair = self.issue_pair(user, record.family)?;
        let rotated = self
            .refresh_tokens
            .rotate(&record.token, &self.refresh_record(&pair, now), now)
            .await
            .inspect_err(log_store_error)?;

        if !rotated {
            warn!("Lost concurrent rotation, revoking family");
            self.revoke_family(&record).await?;
            return Ok(RefreshOutcome::Denied(DenialReason::RaceLost));
        }

        self.record_access(&pair, client, now).await?;

        info!("Session rotated");
        Ok(RefreshOutcome::Rotated(pair))
    }

    /// Revokes one family when given, otherwise every family of the user.
    /// Returns how many records were newly revoked.
    #[instrument(skip(self))]
    pub async fn revoke_session(
        &self,
        user_id: UserId,
        family: Option<FamilyId>,
    ) -> Result<u64, SessionError> {
        let now = Utc::now();
        let revoked = match family {
            Some(family) => {
                self.refresh_tokens
                    .revoke_all_by_family(user_id, family, now)
                    .await
            }
            None => self.refresh_tokens.revoke_all_by_user(user_id, now).await,
        }
        .inspect_err(log_store_error)?;

        info!(revoked, "Sessions revoked");
        Ok(revoked)
    }

    /// Live refresh-token records of the user, one per logged-in device.
    #[instrument(skip(self))]
    pub async fn list_sessions(
        &self,
        user_id: UserId,
    ) -> Result<Vec<RefreshTokenRecord>, SessionError> {
        Ok(self
            .refresh_tokens
            .list_active_by_user(user_id, Utc::now())
            .await
            .inspect_err(log_store_error)?)
    }

    fn issue_pair(&self, user: UserIdentity, family: FamilyId) -> Result<TokenPair, SessionError> {
        let payload = TokenPayload::from(user.clone());
        let access_token = self.codec.sign_access(&payload)?;
        let refresh_token = self.codec.sign_refresh(&payload, family)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            family,
            user,
        })
    }

    fn refresh_record(&self, pair: &TokenPair, now: DateTime<Utc>) -> RefreshTokenRecord {
        RefreshTokenRecord::issue(
            pair.user.id,
            pair.refresh_token.clone(),
            pair.family,
            self.codec.refresh_ttl(),
            now,
        )
    }

    async fn record_access(
        &self,
        pair: &TokenPair,
        client: &ClientInfo,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        let record = SessionRecord {
            user_id: pair.user.id,
            token: pair.access_token.clone(),
            user_agent: client.user_agent.clone(),
            ip_address: client.ip_address.clone(),
            expires_at: now + self.codec.access_ttl(),
        };

        self.sessions
            .insert(&record)
            .await
            .inspect_err(log_store_error)?;
        Ok(())
    }

    async fn revoke_family(&self, record: &RefreshTokenRecord) -> Result<(), SessionError> {
        let revoked = self
            .refresh_tokens
            .revoke_all_by_family(record.user_id, record.family, Utc::now())
            .await
            .inspect_err(log_store_error)?;

        info!(revoked, "Family revoked");
        Ok(())
    }
}

fn log_store_error(e: &StoreError) {
    error!(error = %e, "Session store failure");
}
