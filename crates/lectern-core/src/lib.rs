//! # Lectern Core
//!
//! Core types, errors, and utilities for the Lectern session service.
//!
//! This crate provides foundational types used throughout the workspace:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`permissions`]: Permission name constants used by the role table
//! - [`password`]: Password hashing and verification
//!
//! # Example
//!
//! ```ignore
//! use lectern_core::errors::AppError;
//! use lectern_core::password::{hash_password, verify_password};
//!
//! let error = AppError::unauthorized("Invalid email or password");
//! let hash = hash_password("secure_password")?;
//! assert!(verify_password("secure_password", &hash)?);
//! ```

pub mod errors;
pub mod password;
pub mod permissions;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use password::{hash_password, verify_dummy_password, verify_password};
