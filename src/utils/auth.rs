use thiserror::Error;
use tokio::task::JoinError;
use tokio::time::{Duration, timeout};

const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("password worker failed: {0}")]
    Join(#[from] JoinError),

    #[error("password {0} timed out")]
    Timeout(&'static str),
}

/// Verify a password against a bcrypt hash in a blocking thread with a timeout.
/// Returns Ok(true) if password matches, Ok(false) if not, Err on internal errors/timeouts.
pub async fn verify_password_blocking(
    password: String,
    hashed: String,
    timeout_secs: Option<u64>,
) -> Result<bool, PasswordError> {
    let task = tokio::task::spawn_blocking(move || bcrypt::verify(&password, &hashed));
    let dur = Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

    let joined = timeout(dur, task)
        .await
        .map_err(|_| PasswordError::Timeout("verification"))?;
    Ok(joined??)
}

/// Hash a password in a blocking thread with a timeout and configurable cost.
pub async fn hash_password_blocking(
    password: String,
    cost: u32,
    timeout_secs: Option<u64>,
) -> Result<String, PasswordError> {
    let task = tokio::task::spawn_blocking(move || bcrypt::hash(&password, cost));
    let dur = Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

    let joined = timeout(dur, task)
        .await
        .map_err(|_| PasswordError::Timeout("hashing"))?;
    Ok(joined??)
}
