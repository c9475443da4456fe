//! Shared HTTP helpers.
//!
//! - [`cookies`]: session cookie directives

pub mod cookies;
