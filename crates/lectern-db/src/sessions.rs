//! `sessions` table: one audit row per issued access token.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use lectern_models::SessionRecord;
use lectern_session::{SessionStore, StoreError};

#[derive(Debug, Clone)]
pub struct PgSessionStore {
    db: PgPool,
}

impl PgSessionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    #[instrument(skip_all, fields(user_id = %record.user_id))]
    async fn insert(&self, record: &SessionRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO sessions (user_id, token, user_agent, ip_address, expires_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(record.user_id)
        .bind(&record.token)
        .bind(&record.user_agent)
        .bind(&record.ip_address)
        .bind(record.expires_at)
        .execute(&self.db)
        .await
        .map_err(StoreError::unavailable)?;

        Ok(())
    }
}
