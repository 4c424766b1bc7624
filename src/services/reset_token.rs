use chrono::{DateTime, Duration, Utc};
use rand::RngCore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedResetToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// 16 random bytes, hex encoded, valid for `ttl_secs` from `now`.
pub fn issue_reset_token(now: DateTime<Utc>, ttl_secs: i64) -> IssuedResetToken {
    let mut raw = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut raw);
    let token = raw.iter().map(|b| format!("{:02x}", b)).collect();
    IssuedResetToken {
        token,
        expires_at: now + Duration::seconds(ttl_secs.max(1)),
    }
}

/// A token is usable strictly before its expiry instant.
pub fn is_reset_token_live(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now < expires_at
}
