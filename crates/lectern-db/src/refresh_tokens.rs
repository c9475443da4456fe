//! `refresh_tokens` table.
//!
//! The conditional revoke is a single `UPDATE ... WHERE revoked_at IS NULL`
//! whose affected-row count decides the winner of a concurrent refresh.
//! Rotation and both bulk revocations additionally serialize on a transaction
//! scoped advisory lock keyed by the family, so a revoke cannot commit
//! between a rotation's revoke and its insert and miss the new row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use lectern_models::{FamilyId, RefreshTokenRecord, UserId};
use lectern_session::{RefreshTokenStore, StoreError};

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, token, family, expires_at, revoked_at, created_at FROM refresh_tokens";

#[derive(Debug, Clone)]
pub struct PgRefreshTokenStore {
    db: PgPool,
}

impl PgRefreshTokenStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

async fn lock_family(
    tx: &mut Transaction<'_, Postgres>,
    family: FamilyId,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
        .bind(family)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn insert_record<'e, E>(executor: E, record: &RefreshTokenRecord) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "INSERT INTO refresh_tokens (id, user_id, token, family, expires_at, revoked_at, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(record.id)
    .bind(record.user_id)
    .bind(&record.token)
    .bind(record.family)
    .bind(record.expires_at)
    .bind(record.revoked_at)
    .bind(record.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

async fn revoke_active<'e, E>(
    executor: E,
    token: &str,
    at: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        "UPDATE refresh_tokens SET revoked_at = $2 WHERE token = $1 AND revoked_at IS NULL",
    )
    .bind(token)
    .bind(at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenStore {
    #[instrument(skip_all, fields(user_id = %record.user_id, family = %record.family))]
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), StoreError> {
        insert_record(&self.db, record)
            .await
            .map_err(StoreError::unavailable)
    }

    #[instrument(skip_all)]
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, StoreError> {
        sqlx::query_as::<_, RefreshTokenRecord>(&format!("{SELECT_COLUMNS} WHERE token = $1"))
            .bind(token)
            .fetch_optional(&self.db)
            .await
            .map_err(StoreError::unavailable)
    }

    #[instrument(skip_all)]
    async fn revoke_if_active(&self, token: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        revoke_active(&self.db, token, at)
            .await
            .map_err(StoreError::unavailable)
    }

    #[instrument(skip(self))]
    async fn revoke_all_by_family(
        &self,
        user_id: UserId,
        family: FamilyId,
        at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let revoke = async {
            let mut tx = self.db.begin().await?;
            lock_family(&mut tx, family).await?;

            let result = sqlx::query(
                "UPDATE refresh_tokens SET revoked_at = $3
                 WHERE user_id = $1 AND family = $2 AND revoked_at IS NULL",
            )
            .bind(user_id)
            .bind(family)
            .bind(at)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok::<_, sqlx::Error>(result.rows_affected())
        };

        revoke.await.map_err(StoreError::unavailable)
    }

    #[instrument(skip(self))]
    async fn revoke_all_by_user(
        &self,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let revoke = async {
            let mut tx = self.db.begin().await?;

            // Locks are taken in family order so two bulk revokes cannot deadlock.
            let families = sqlx::query_scalar::<_, FamilyId>(
                "SELECT DISTINCT family FROM refresh_tokens
                 WHERE user_id = $1 AND revoked_at IS NULL
                 ORDER BY family",
            )
            .bind(user_id)
            .fetch_all(&mut *tx)
            .await?;

            for family in families {
                lock_family(&mut tx, family).await?;
            }

            let result = sqlx::query(
                "UPDATE refresh_tokens SET revoked_at = $2
                 WHERE user_id = $1 AND revoked_at IS NULL",
            )
            .bind(user_id)
            .bind(at)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok::<_, sqlx::Error>(result.rows_affected())
        };

        revoke.await.map_err(StoreError::unavailable)
    }

    #[instrument(skip(self))]
    async fn list_active_by_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshTokenRecord>, StoreError> {
        sqlx::query_as::<_, RefreshTokenRecord>(&format!(
            "{SELECT_COLUMNS}
             WHERE user_id = $1 AND revoked_at IS NULL AND expires_at > $2
             ORDER BY created_at"
        ))
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.db)
        .await
        .map_err(StoreError::unavailable)
    }

    #[instrument(skip(self))]
    async fn delete_expired_revoked(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "DELETE FROM refresh_tokens WHERE revoked_at IS NOT NULL AND expires_at <= $1",
        )
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(StoreError::unavailable)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip_all, fields(user_id = %next.user_id, family = %next.family))]
    async fn rotate(
        &self,
        old_token: &str,
        next: &RefreshTokenRecord,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let rotate = async {
            let mut tx = self.db.begin().await?;
            lock_family(&mut tx, next.family).await?;

            if !revoke_active(&mut *tx, old_token, at).await? {
                tx.rollback().await?;
                return Ok(false);
            }

            insert_record(&mut *tx, next).await?;
            tx.commit().await?;
            Ok::<_, sqlx::Error>(true)
        };

        rotate.await.map_err(StoreError::unavailable)
    }
}
