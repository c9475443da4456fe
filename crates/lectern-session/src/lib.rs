//! # Lectern Session
//!
//! The session and refresh-token lifecycle.
//!
//! - [`store`]: persistence seams ([`RefreshTokenStore`], [`SessionStore`],
//!   [`UserDirectory`])
//! - [`memory`]: in-process implementations of the stores
//! - [`manager`]: [`SessionManager`], which runs login, rotation and logout
//! - [`sweeper`]: periodic deletion of revoked, expired records
//!
//! # Rotation protocol
//!
//! Every refresh token is single-use. Presenting one that was already
//! rotated away (or losing the race to rotate it) revokes its whole family,
//! which forces every holder of that login lineage to authenticate again.
//!
//! ```ignore
//! let manager = SessionManager::new(codec, refresh_tokens, sessions, users);
//! let pair = manager.create_session(&user, &ClientInfo::default()).await?;
//!
//! match manager.refresh_session(&pair.refresh_token, &client).await? {
//!     RefreshOutcome::Rotated(next) => { /* set cookies */ }
//!     RefreshOutcome::Denied(reason) => { /* 401, log in again */ }
//! }
//! ```

pub mod error;
pub mod manager;
pub mod memory;
pub mod store;
pub mod sweeper;

pub use error::{SessionError, StoreError};
pub use manager::{ClientInfo, DenialReason, RefreshOutcome, SessionManager, TokenPair};
pub use memory::{MemoryRefreshTokenStore, MemorySessionStore, MemoryUserDirectory};
pub use store::{RefreshTokenStore, SessionStore, UserCredentials, UserDirectory};
pub use sweeper::TokenSweeper;
