//! # Lectern Models
//!
//! Domain models and DTOs for the Lectern session service.
//!
//! # Modules
//!
//! - [`ids`]: strongly-typed UUID newtypes
//! - [`users`]: the authenticated identity and its role
//! - [`sessions`]: persisted refresh-token and access-session records
//! - [`auth`]: request/response bodies for the auth endpoints
//!
//! # Example
//!
//! ```ignore
//! use lectern_models::{FamilyId, RefreshTokenRecord, UserIdentity};
//!
//! let record = RefreshTokenRecord::issue(user.id, token, FamilyId::new(), ttl, Utc::now());
//! assert!(record.is_active());
//! ```

pub mod auth;
pub mod ids;
pub mod sessions;
pub mod users;

// Re-export commonly used types at crate root for convenience
pub use auth::{
    ActiveSession, LoginRequest, LogoutRequest, MessageResponse, ProfileResponse,
    RefreshTokenRequest, TokenResponse,
};
pub use ids::{FamilyId, OrganizationId, RefreshTokenId, UserId};
pub use sessions::{RefreshTokenRecord, SessionRecord};
pub use users::{Role, UnknownRole, UserIdentity};
