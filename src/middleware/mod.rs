//! Request extractors for authentication, permission checks and client
//! metadata.

pub mod auth;
pub mod client;
