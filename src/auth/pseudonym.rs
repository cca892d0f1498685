use std::fmt::Write;

use sha2::{Digest, Sha256};

/// Public handle length: 16 hex characters, i.e. the first 8 digest bytes.
pub const PSEUDONYM_LEN: usize = 16;

/// Registration gives up after this many collision retries instead of
/// looping forever.
pub const MAX_ATTEMPTS: u32 = 32;

/// Stable fingerprint of an email address. Attempt 0 is the canonical
/// pseudonym; higher attempts mix a counter into the digest so collision
/// handling stays deterministic.
pub fn fingerprint(email: &str, attempt: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    if attempt > 0 {
        hasher.update(attempt.to_le_bytes());
    }
    let digest = hasher.finalize();

    let mut out = String::with_capacity(PSEUDONYM_LEN);
    for byte in digest.iter().take(PSEUDONYM_LEN / 2) {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_deterministic() {
        assert_eq!(
            fingerprint("alice@example.com", 0),
            fingerprint("alice@example.com", 0)
        );
    }

    #[test]
    fn fingerprint_is_sixteen_hex_chars() {
        let p = fingerprint("bob@example.com", 0);
        assert_eq!(p.len(), PSEUDONYM_LEN);
        assert!(p.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_emails_diverge() {
        assert_ne!(
            fingerprint("a@example.com", 0),
            fingerprint("b@example.com", 0)
        );
    }

    #[test]
    fn attempts_diverge() {
        let email = "carol@example.com";
        assert_ne!(fingerprint(email, 0), fingerprint(email, 1));
        assert_ne!(fingerprint(email, 1), fingerprint(email, 2));
    }
}
