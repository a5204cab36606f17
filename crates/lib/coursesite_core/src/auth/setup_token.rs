//! Invitation / setup token generation.
//!
//! Setup tokens are opaque: 32 bytes from the thread-local CSPRNG, hex
//! encoded. Uniqueness relies on entropy alone.

use chrono::{DateTime, Duration, Utc};
use rand::{RngCore, rng};

/// Number of random bytes in a setup token.
const SETUP_TOKEN_BYTES: usize = 32;

/// Validity window of a freshly issued setup token: 7 days.
pub const SETUP_TOKEN_VALIDITY_DAYS: i64 = 7;

/// Generate a new setup token (64 lowercase hex characters).
pub fn generate_setup_token() -> String {
    let mut bytes = [0u8; SETUP_TOKEN_BYTES];
    rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Expiry instant for a token issued at `issued_at`.
pub fn setup_token_expiry(issued_at: DateTime<Utc>) -> DateTime<Utc> {
    issued_at + Duration::days(SETUP_TOKEN_VALIDITY_DAYS)
}
