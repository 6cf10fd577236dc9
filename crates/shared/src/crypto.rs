//! Anti-forgery nonce helpers.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Derives the anti-forgery nonce bound to an admin session.
///
/// The nonce is `hex(HMAC-SHA256(secret, session_id))`, so it is only valid
/// for the session it was issued to and cannot be forged without the secret.
pub fn session_nonce(secret: &str, session_id: &str) -> String {
    let mut mac = new_mac(secret);
    mac.update(session_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a nonce presented by a client against the session it claims.
///
/// Comparison happens in constant time.
pub fn verify_session_nonce(secret: &str, session_id: &str, nonce: &str) -> bool {
    let Ok(presented) = hex::decode(nonce.trim()) else {
        return false;
    };
    let mut mac = new_mac(secret);
    mac.update(session_id.as_bytes());
    mac.verify_slice(&presented).is_ok()
}

fn new_mac(secret: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_nonce_is_deterministic() {
        let a = session_nonce("secret", "session-1");
        let b = session_nonce("secret", "session-1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_session_nonce_differs_per_session() {
        assert_ne!(
            session_nonce("secret", "session-1"),
            session_nonce("secret", "session-2")
        );
    }

    #[test]
    fn test_session_nonce_differs_per_secret() {
        assert_ne!(
            session_nonce("secret-a", "session-1"),
            session_nonce("secret-b", "session-1")
        );
    }

    #[test]
    fn test_verify_session_nonce_accepts_issued_nonce() {
        let nonce = session_nonce("secret", "jti-42");
        assert!(verify_session_nonce("secret", "jti-42", &nonce));
    }

    #[test]
    fn test_verify_session_nonce_rejects_other_session() {
        let nonce = session_nonce("secret", "jti-42");
        assert!(!verify_session_nonce("secret", "jti-43", &nonce));
    }

    #[test]
    fn test_verify_session_nonce_rejects_garbage() {
        assert!(!verify_session_nonce("secret", "jti-42", "not-hex"));
        assert!(!verify_session_nonce("secret", "jti-42", ""));
        assert!(!verify_session_nonce("secret", "jti-42", "abcd"));
    }
}
