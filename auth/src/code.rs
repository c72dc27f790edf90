//! Confirmation code generation and verification.
//!
//! Codes are short numeric strings typed from an email. Only a SHA-256
//! hash is stored, so a database leak does not expose live codes.
//! Verification compares hashes in constant time.

use base64::Engine;
use sha2::{Digest, Sha256};

/// Number of digits in a confirmation code.
pub const CODE_LEN: u32 = 6;

/// Generate a random confirmation code, zero-padded to [`CODE_LEN`]
/// digits.
#[must_use]
pub fn generate() -> String {
    use rand::Rng;

    let mut rng = rand::thread_rng();
    let max = 10_u32.pow(CODE_LEN);
    format!("{:0width$}", rng.gen_range(0..max), width = CODE_LEN as usize)
}

/// Hash a code for storage, base64url encoded.
#[must_use]
pub fn hash(code: &str) -> String {
    let digest = Sha256::digest(code.as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest)
}

/// Check a presented code against a stored hash in constant time.
#[must_use]
pub fn verify(code: &str, stored_hash: &str) -> bool {
    constant_time_eq::constant_time_eq(hash(code).as_bytes(), stored_hash.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_six_digits() {
        for _ in 0..100 {
            let code = generate();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_verify_accepts_the_right_code() {
        let code = generate();
        let stored = hash(&code);
        assert!(verify(&code, &stored));
    }

    #[test]
    fn test_verify_rejects_a_wrong_code() {
        let stored = hash("123456");
        assert!(!verify("654321", &stored));
        assert!(!verify("", &stored));
    }

    #[test]
    fn test_hash_is_not_the_code() {
        assert_ne!(hash("123456"), "123456");
    }
}
