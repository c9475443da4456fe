//! # Lectern Auth
//!
//! Token signing/verification and the static authorization rules.
//!
//! This crate provides:
//!
//! - [`claims`]: the typed payload and the per-class claim structures
//! - [`codec`]: [`TokenCodec`], which signs and verifies access and refresh
//!   tokens with independent secrets and lifetimes
//! - [`authorization`]: the role→permission table and resource scoping
//!
//! # Token Types
//!
//! - **Access Token** ([`AccessClaims`]): 15 minutes, verified statelessly
//! - **Refresh Token** ([`RefreshClaims`]): 7 days, single-use, carries the
//!   login family
//!
//! # Example
//!
//! ```ignore
//! use lectern_auth::{TokenCodec, TokenPayload};
//! use lectern_config::JwtConfig;
//!
//! let codec = TokenCodec::new(&JwtConfig::from_env());
//! let token = codec.sign_access(&payload)?;
//! let claims = codec.verify_access(&token)?;
//! assert_eq!(claims.payload, payload);
//! ```

pub mod authorization;
pub mod claims;
pub mod codec;

// Re-export commonly used types at crate root
pub use authorization::{ResourceScope, can_access_resource, has_permission, permissions_for};
pub use claims::{AccessClaims, RefreshClaims, TokenKind, TokenPayload};
pub use codec::{TokenCodec, TokenError};
