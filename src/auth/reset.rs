use rand::{rngs::OsRng, RngCore};

use super::repo_types::ResetGrant;

/// How long a reset token stays usable (1 hour).
pub const RESET_WINDOW_MS: i64 = 3_600_000;

const TOKEN_BYTES: usize = 20;

/// Issues a fresh grant: 20 random bytes hex-encoded, expiring one window from `now_ms`.
pub fn issue_grant(now_ms: i64) -> ResetGrant {
    let mut buf = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut buf);
    ResetGrant {
        token: hex::encode(buf),
        expires_at_ms: now_ms + RESET_WINDOW_MS,
    }
}

/// A grant is live up to and including its expiry instant.
pub fn is_live(expires_at_ms: i64, now_ms: i64) -> bool {
    now_ms <= expires_at_ms
}

/// Origin the reset link should point at.
///
/// The requesting origin is used when `allowed` is empty or lists it; any
/// other origin falls back to `fallback`.
pub fn link_origin<'a>(
    requested: Option<&'a str>,
    allowed: &[String],
    fallback: &'a str,
) -> &'a str {
    match requested {
        Some(origin)
            if allowed.is_empty()
                || allowed
                    .iter()
                    .any(|a| a.trim_end_matches('/') == origin.trim_end_matches('/')) =>
        {
            origin
        }
        _ => fallback,
    }
}

pub fn reset_link(origin: &str, token: &str) -> String {
    format!("{}/reset-password/{}", origin.trim_end_matches('/'), token)
}
