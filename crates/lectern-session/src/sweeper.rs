//! Deletion of refresh-token records that are both revoked and expired.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::error::StoreError;
use crate::store::RefreshTokenStore;

/// Periodic housekeeping over the refresh-token store.
///
/// Records that are still active are never touched, so a sweep can run at
/// any time alongside live traffic.
#[derive(Clone)]
pub struct TokenSweeper {
    refresh_tokens: Arc<dyn RefreshTokenStore>,
}

impl std::fmt::Debug for TokenSweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSweeper").finish()
    }
}

impl TokenSweeper {
    pub fn new(refresh_tokens: Arc<dyn RefreshTokenStore>) -> Self {
        Self { refresh_tokens }
    }

    /// Runs one sweep and returns the number of records deleted.
    pub async fn run_once(&self) -> Result<u64, StoreError> {
        let deleted = self.refresh_tokens.delete_expired_revoked(Utc::now()).await?;

        if deleted > 0 {
            info!(deleted, "Swept expired refresh tokens");
        }

        Ok(deleted)
    }

    /// Sweeps every `period` until the handle is aborted, passing each
    /// sweep's deletion count to `on_sweep`. Failures are logged and the loop
    /// continues with the next tick.
    pub fn spawn<F>(self, period: Duration, on_sweep: F) -> JoinHandle<()>
    where
        F: Fn(u64) + Send + 'static,
    {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                match self.run_once().await {
                    Ok(deleted) => on_sweep(deleted),
                    Err(e) => error!(error = %e, "Refresh token sweep failed"),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRefreshTokenStore;
    use chrono::Duration as ChronoDuration;
    use lectern_models::{FamilyId, RefreshTokenRecord, UserId};

    #[tokio::test]
    async fn test_run_once_deletes_only_revoked_and_expired() {
        let store = MemoryRefreshTokenStore::new();
        let user = UserId::new();
        let past = Utc::now() - ChronoDuration::days(10);

        let stale = RefreshTokenRecord::issue(
            user,
            "stale".to_string(),
            FamilyId::new(),
            ChronoDuration::days(7),
            past,
        );
        let expired_unrevoked = RefreshTokenRecord::issue(
            user,
            "expired-active".to_string(),
            FamilyId::new(),
            ChronoDuration::days(7),
            past,
        );
        let revoked_live = RefreshTokenRecord::issue(
            user,
            "revoked-live".to_string(),
            FamilyId::new(),
            ChronoDuration::days(7),
            Utc::now(),
        );
        for record in [&stale, &expired_unrevoked, &revoked_live] {
            store.insert(record).await.unwrap();
        }
        store.revoke_if_active("stale", Utc::now()).await.unwrap();
        store.revoke_if_active("revoked-live", Utc::now()).await.unwrap();

        let sweeper = TokenSweeper::new(Arc::new(store.clone()));
        assert_eq!(sweeper.run_once().await.unwrap(), 1);
        assert_eq!(sweeper.run_once().await.unwrap(), 0);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_sweeper_runs_on_interval() {
        let store = MemoryRefreshTokenStore::new();
        let past = Utc::now() - ChronoDuration::days(10);
        let record = RefreshTokenRecord::issue(
            UserId::new(),
            "stale".to_string(),
            FamilyId::new(),
            ChronoDuration::days(1),
            past,
        );
        store.insert(&record).await.unwrap();
        store.revoke_if_active("stale", Utc::now()).await.unwrap();

        let swept = Arc::new(std::sync::atomic::AtomicU64::new(0));
        let counter = swept.clone();
        let handle = TokenSweeper::new(Arc::new(store.clone())).spawn(
            Duration::from_secs(60),
            move |deleted| {
                counter.fetch_add(deleted, std::sync::atomic::Ordering::SeqCst);
            },
        );
        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.abort();

        assert_eq!(store.len().await, 0);
        assert_eq!(swept.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
