//! # Lectern DB
//!
//! PostgreSQL connection pool and the sqlx-backed session stores.
//!
//! Each store wraps a cloned [`PgPool`] and implements one of the traits from
//! `lectern_session::store`. Queries are built at runtime, so the crate
//! compiles without a live database.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lectern_db::{init_db_pool, PgRefreshTokenStore, PgSessionStore, PgUserDirectory};
//!
//! let pool = init_db_pool().await;
//! let manager = SessionManager::new(
//!     codec,
//!     Arc::new(PgRefreshTokenStore::new(pool.clone())),
//!     Arc::new(PgSessionStore::new(pool.clone())),
//!     Arc::new(PgUserDirectory::new(pool)),
//! );
//! ```

use std::env;

pub mod refresh_tokens;
pub mod sessions;
pub mod users;

pub use refresh_tokens::PgRefreshTokenStore;
pub use sessions::PgSessionStore;
pub use users::{NewUser, PgUserDirectory};

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Initializes a PostgreSQL connection pool from `DATABASE_URL`.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is not set or the database cannot be reached.
/// Call once during startup.
pub async fn init_db_pool() -> PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database")
}
