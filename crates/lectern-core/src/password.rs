//! Password hashing with bcrypt.
//!
//! Hashing policy is deliberately minimal: the default bcrypt cost, no
//! peppering. Login compares the submitted password against the stored hash
//! and nothing else.

use std::sync::OnceLock;

use anyhow::Context;
use bcrypt::{DEFAULT_COST, hash, verify};

static DUMMY_HASH: OnceLock<String> = OnceLock::new();

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    hash(password, DEFAULT_COST).context("Failed to hash password")
}

pub fn verify_password(password: &str, hashed: &str) -> anyhow::Result<bool> {
    verify(password, hashed).context("Failed to verify password")
}

/// Runs a full bcrypt verification against a throwaway hash and always
/// reports a mismatch. Login calls this when no account matches the email, so
/// an unknown email costs the same as a wrong password.
pub fn verify_dummy_password(password: &str) -> anyhow::Result<bool> {
    let dummy = match DUMMY_HASH.get() {
        Some(dummy) => dummy,
        None => {
            let hashed = hash_password("lectern-dummy-password")?;
            DUMMY_HASH.get_or_init(|| hashed)
        }
    };

    verify_password(password, dummy)?;
    Ok(false)
}
