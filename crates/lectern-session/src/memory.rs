//! In-memory stores using a Tokio mutex.
//!
//! Suitable for single-process deployments and tests. Every operation runs
//! under one lock acquisition, so the conditional revoke and rotation are
//! atomic with respect to each other.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use lectern_models::{FamilyId, RefreshTokenRecord, SessionRecord, UserId, UserIdentity};

use crate::error::StoreError;
use crate::store::{RefreshTokenStore, SessionStore, UserCredentials, UserDirectory};

/// Refresh-token records keyed by token value.
#[derive(Debug, Clone, Default)]
pub struct MemoryRefreshTokenStore {
    records: Arc<Mutex<HashMap<String, RefreshTokenRecord>>>,
}

impl MemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record in the given family, oldest first.
    pub async fn family_records(&self, family: FamilyId) -> Vec<RefreshTokenRecord> {
        let records = self.records.lock().await;
        let mut matching: Vec<_> = records
            .values()
            .filter(|r| r.family == family)
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.created_at);
        matching
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }
}

fn revoke_matching<F>(
    records: &mut HashMap<String, RefreshTokenRecord>,
    at: DateTime<Utc>,
    predicate: F,
) -> u64
where
    F: Fn(&RefreshTokenRecord) -> bool,
{
    let mut revoked = 0;
    for record in records.values_mut() {
        if record.is_active() && predicate(record) {
            record.revoked_at = Some(at);
            revoked += 1;
        }
    }
    revoked
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        if records.contains_key(&record.token) {
            return Err(StoreError::unavailable(anyhow::anyhow!(
                "duplicate refresh token record"
            )));
        }
        records.insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, StoreError> {
        Ok(self.records.lock().await.get(token).cloned())
    }

    async fn revoke_if_active(&self, token: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        match records.get_mut(token) {
            Some(record) if record.is_active() => {
                record.revoked_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_by_family(
        &self,
        user_id: UserId,
        family: FamilyId,
        at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut records = self.records.lock().await;
        Ok(revoke_matching(&mut records, at, |r| {
            r.user_id == user_id && r.family == family
        }))
    }

    async fn revoke_all_by_user(
        &self,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut records = self.records.lock().await;
        Ok(revoke_matching(&mut records, at, |r| r.user_id == user_id))
    }

    async fn list_active_by_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshTokenRecord>, StoreError> {
        let records = self.records.lock().await;
        let mut active: Vec<_> = records
            .values()
            .filter(|r| r.user_id == user_id && r.is_active() && !r.is_expired(now))
            .cloned()
            .collect();
        active.sort_by_key(|r| r.created_at);
        Ok(active)
    }

    async fn delete_expired_revoked(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, r| r.is_active() || !r.is_expired(now));
        Ok((before - records.len()) as u64)
    }

    async fn rotate(
        &self,
        old_token: &str,
        next: &RefreshTokenRecord,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        match records.get_mut(old_token) {
            Some(record) if record.is_active() => record.revoked_at = Some(at),
            _ => return Ok(false),
        }
        records.insert(next.token.clone(), next.clone());
        Ok(true)
    }
}

/// Access-session audit rows, append-only.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    records: Arc<Mutex<Vec<SessionRecord>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<SessionRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct StoredUser {
    credentials: UserCredentials,
    last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryUserDirectory {
    users: Arc<Mutex<HashMap<UserId, StoredUser>>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, identity: UserIdentity, password_hash: String) {
        self.users.lock().await.insert(
            identity.id,
            StoredUser {
                credentials: UserCredentials {
                    identity,
                    password_hash,
                },
                last_login_at: None,
            },
        );
    }

    pub async fn remove(&self, id: UserId) {
        self.users.lock().await.remove(&id);
    }

    pub async fn last_login(&self, id: UserId) -> Option<DateTime<Utc>> {
        self.users
            .lock()
            .await
            .get(&id)
            .and_then(|u| u.last_login_at)
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<UserIdentity>, StoreError> {
        Ok(self
            .users
            .lock()
            .await
            .get(&id)
            .map(|u| u.credentials.identity.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, StoreError> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|u| u.credentials.identity.email.eq_ignore_ascii_case(email))
            .map(|u| u.credentials.clone()))
    }

    async fn touch_last_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(user) = self.users.lock().await.get_mut(&id) {
            user.last_login_at = Some(at);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(user_id: UserId, family: FamilyId, token: &str) -> RefreshTokenRecord {
        RefreshTokenRecord::issue(
            user_id,
            token.to_string(),
            family,
            Duration::days(7),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_revoke_if_active_only_once() {
        let store = MemoryRefreshTokenStore::new();
        store
            .insert(&record(UserId::new(), FamilyId::new(), "t0"))
            .await
            .unwrap();

        assert!(store.revoke_if_active("t0", Utc::now()).await.unwrap());
        assert!(!store.revoke_if_active("t0", Utc::now()).await.unwrap());
        assert!(!store.revoke_if_active("missing", Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_by_family_is_scoped() {
        let store = MemoryRefreshTokenStore::new();
        let user = UserId::new();
        let (laptop, phone) = (FamilyId::new(), FamilyId::new());
        store.insert(&record(user, laptop, "a")).await.unwrap();
        store.insert(&record(user, phone, "b")).await.unwrap();

        assert_eq!(
            store
                .revoke_all_by_family(user, laptop, Utc::now())
                .await
                .unwrap(),
            1
        );
        assert!(!store.find_by_token("a").await.unwrap().unwrap().is_active());
        assert!(store.find_by_token("b").await.unwrap().unwrap().is_active());

        // Idempotent: already revoked records are left alone.
        assert_eq!(
            store
                .revoke_all_by_family(user, laptop, Utc::now())
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_revoke_all_by_user_keeps_other_users() {
        let store = MemoryRefreshTokenStore::new();
        let (alice, bob) = (UserId::new(), UserId::new());
        store.insert(&record(alice, FamilyId::new(), "a1")).await.unwrap();
        store.insert(&record(alice, FamilyId::new(), "a2")).await.unwrap();
        store.insert(&record(bob, FamilyId::new(), "b1")).await.unwrap();

        assert_eq!(store.revoke_all_by_user(alice, Utc::now()).await.unwrap(), 2);
        assert_eq!(
            store
                .list_active_by_user(bob, Utc::now())
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_rotate_refuses_revoked_token() {
        let store = MemoryRefreshTokenStore::new();
        let user = UserId::new();
        let family = FamilyId::new();
        store.insert(&record(user, family, "t0")).await.unwrap();

        assert!(
            store
                .rotate("t0", &record(user, family, "t1"), Utc::now())
                .await
                .unwrap()
        );
        assert!(
            !store
                .rotate("t0", &record(user, family, "t2"), Utc::now())
                .await
                .unwrap()
        );
        assert!(store.find_by_token("t2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_expired_revoked_keeps_live_records() {
        let store = MemoryRefreshTokenStore::new();
        let user = UserId::new();
        let family = FamilyId::new();
        store.insert(&record(user, family, "old")).await.unwrap();
        store.insert(&record(user, family, "live")).await.unwrap();
        store.revoke_if_active("old", Utc::now()).await.unwrap();

        let later = Utc::now() + Duration::days(8);
        assert_eq!(store.delete_expired_revoked(later).await.unwrap(), 1);
        assert!(store.find_by_token("old").await.unwrap().is_none());
        assert!(store.find_by_token("live").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_token_insert_fails() {
        let store = MemoryRefreshTokenStore::new();
        let r = record(UserId::new(), FamilyId::new(), "dup");
        store.insert(&r).await.unwrap();
        assert!(store.insert(&r).await.is_err());
    }

    #[tokio::test]
    async fn test_user_directory_lookup() {
        let directory = MemoryUserDirectory::new();
        let identity = UserIdentity {
            id: UserId::new(),
            email: "Teacher@School.example".to_string(),
            role: lectern_models::Role::Teacher,
            organization_id: None,
        };
        directory.insert(identity.clone(), "hash".to_string()).await;

        let found = directory
            .find_credentials_by_email("teacher@school.example")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.identity, identity);
        assert_eq!(
            directory.find_user_by_id(identity.id).await.unwrap(),
            Some(identity.clone())
        );

        let at = Utc::now();
        directory.touch_last_login(identity.id, at).await.unwrap();
        assert_eq!(directory.last_login(identity.id).await, Some(at));
    }
}
