use lectern_auth::TokenError;

/// The persistence layer failed or could not be reached.
///
/// Never retried: a conditional revoke whose outcome is unknown must not be
/// replayed.
#[derive(Debug, thiserror::Error)]
#[error("Session store unavailable: {0}")]
pub struct StoreError(#[source] pub anyhow::Error);

impl StoreError {
    pub fn unavailable<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self(err.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Persistence(#[from] StoreError),

    #[error(transparent)]
    Token(#[from] TokenError),
}
