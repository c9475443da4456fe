//! `users` table, as far as the session service needs it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use lectern_models::{OrganizationId, Role, UserId, UserIdentity};
use lectern_session::{StoreError, UserCredentials, UserDirectory};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    role: String,
    organization_id: Option<OrganizationId>,
}

impl TryFrom<UserRow> for UserIdentity {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(StoreError::unavailable)?;
        Ok(UserIdentity {
            id: row.id,
            email: row.email,
            role,
            organization_id: row.organization_id,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password: String,
}

/// Fields needed to create an account from the admin CLI.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub organization_id: Option<OrganizationId>,
}

#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    db: PgPool,
}

impl PgUserDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Inserts a user. Returns `None` when the email is already taken in any
    /// letter case.
    #[instrument(skip_all, fields(email = %user.email, role = %user.role))]
    pub async fn create_user(&self, user: &NewUser) -> Result<Option<UserIdentity>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (first_name, last_name, email, password, role, organization_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT DO NOTHING
             RETURNING id, email, role, organization_id",
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.organization_id)
        .fetch_optional(&self.db)
        .await
        .map_err(StoreError::unavailable)?;

        row.map(UserIdentity::try_from).transpose()
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    #[instrument(skip(self))]
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<UserIdentity>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, role, organization_id FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(StoreError::unavailable)?;

        row.map(UserIdentity::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, StoreError> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            "SELECT id, email, role, organization_id, password
             FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(StoreError::unavailable)?;

        row.map(|row| {
            Ok::<_, StoreError>(UserCredentials {
                identity: row.user.try_into()?,
                password_hash: row.password,
            })
        })
        .transpose()
    }

    #[instrument(skip(self))]
    async fn touch_last_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET last_login_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.db)
            .await
            .map_err(StoreError::unavailable)?;

        Ok(())
    }
}
