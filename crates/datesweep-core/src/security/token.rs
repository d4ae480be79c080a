use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Generate a random URL-safe token (256 bits of entropy).
///
/// Used for login tokens and session cookies. Only the hash is stored.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Hex-encoded SHA-256 of a token, as stored in the database
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique_and_url_safe() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_hash_is_stable_hex() {
        let hash = hash_token("secret");
        assert_eq!(hash, hash_token("secret"));
        assert_eq!(hash.len(), 64);
        assert_ne!(hash, hash_token("Secret"));
    }
}
