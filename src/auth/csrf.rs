//! Stateless CSRF tokens: `<unix-ts>:<hex hmac-sha256(ts, secret)>`.
//!
//! The secret lives for one process run, so every outstanding token dies on
//! restart. Tokens older than two hours are rejected.

use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const TOKEN_MAX_AGE_SECS: i64 = 2 * 60 * 60;
const FALLBACK_SECRET: &[u8; 32] = b"fallback-secret-please-restart!!";

pub struct CsrfSigner {
    secret: [u8; 32],
}

impl Default for CsrfSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl CsrfSigner {
    /// Draws a fresh 32-byte secret; falls back to a fixed value if the OS
    /// RNG is unavailable.
    #[must_use]
    pub fn new() -> Self {
        let mut secret = [0u8; 32];
        if rand::thread_rng().try_fill_bytes(&mut secret).is_err() {
            secret.copy_from_slice(FALLBACK_SECRET);
        }
        Self { secret }
    }

    #[must_use]
    pub fn generate(&self) -> String {
        self.token_at(Utc::now().timestamp())
    }

    fn token_at(&self, ts: i64) -> String {
        let ts = ts.to_string();
        format!("{ts}:{}", hex::encode(self.mac_of(&ts)))
    }

    fn mac_of(&self, ts: &str) -> Vec<u8> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("hmac accepts any key length");
        mac.update(ts.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    /// A token is valid iff it has exactly two `:`-parts, a parseable
    /// timestamp at most two hours old, and a MAC that verifies in constant
    /// time.
    #[must_use]
    pub fn validate(&self, token: &str) -> bool {
        let mut parts = token.split(':');
        let (Some(ts_str), Some(sig), None) = (parts.next(), parts.next(), parts.next()) else {
            return false;
        };
        let Ok(ts) = ts_str.parse::<i64>() else {
            return false;
        };
        if Utc::now().timestamp() - ts > TOKEN_MAX_AGE_SECS {
            return false;
        }
        let Ok(raw) = hex::decode(sig) else {
            return false;
        };
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("hmac accepts any key length");
        mac.update(ts_str.as_bytes());
        mac.verify_slice(&raw).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_validates() {
        let signer = CsrfSigner::new();
        assert!(signer.validate(&signer.generate()));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let signer = CsrfSigner::new();
        assert!(!signer.validate(""));
        assert!(!signer.validate("no-colon"));
        assert!(!signer.validate("1:2:3"));
        assert!(!signer.validate("notanumber:deadbeef"));
    }

    #[test]
    fn test_tampering_invalidates() {
        let signer = CsrfSigner::new();
        let token = signer.generate();
        let (ts, sig) = token.split_once(':').unwrap();

        let bumped_ts = format!("{}:{}", ts.parse::<i64>().unwrap() - 60, sig);
        assert!(!signer.validate(&bumped_ts));

        let mut flipped = sig.to_string();
        let last = if flipped.pop() == Some('0') { '1' } else { '0' };
        flipped.push(last);
        assert!(!signer.validate(&format!("{ts}:{flipped}")));
    }

    #[test]
    fn test_expired_token_rejected() {
        let signer = CsrfSigner::new();
        let old = signer.token_at(Utc::now().timestamp() - TOKEN_MAX_AGE_SECS - 1);
        assert!(!signer.validate(&old));
        let fresh_enough = signer.token_at(Utc::now().timestamp() - TOKEN_MAX_AGE_SECS + 60);
        assert!(signer.validate(&fresh_enough));
    }

    #[test]
    fn test_other_process_secret_rejected() {
        let a = CsrfSigner::new();
        let b = CsrfSigner::new();
        assert!(!b.validate(&a.generate()));
    }
}
