//! Anti-forgery tokens bound to an action and a login session
//!
//! Time is split into ticks of half the configured lifetime. A token is the
//! truncated HMAC of `(tick, action, user id, session)` and is accepted during
//! the tick it was issued in and the one after.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::Actor;

type HmacSha256 = Hmac<Sha256>;

/// Length of an issued token in hex characters
const NONCE_LEN: usize = 10;

/// How old an accepted token is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceAge {
    /// Issued during the current tick
    Fresh,
    /// Issued during the previous tick
    Aging,
}

/// Issues and verifies anti-forgery tokens
#[derive(Clone)]
pub struct NonceIssuer {
    secret: Vec<u8>,
    lifetime_secs: u64,
}

impl NonceIssuer {
    pub fn new(secret: impl Into<Vec<u8>>, lifetime_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            lifetime_secs: lifetime_secs.max(2),
        }
    }

    /// Issue a token for `action` on behalf of `actor`
    pub fn issue(&self, action: &str, actor: &Actor) -> String {
        self.issue_at(action, actor, Utc::now().timestamp())
    }

    /// Verify a token for `action` and `actor`
    pub fn verify(&self, nonce: &str, action: &str, actor: &Actor) -> Option<NonceAge> {
        self.verify_at(nonce, action, actor, Utc::now().timestamp())
    }

    pub fn issue_at(&self, action: &str, actor: &Actor, now: i64) -> String {
        self.digest(self.tick(now), action, actor)
    }

    pub fn verify_at(&self, nonce: &str, action: &str, actor: &Actor, now: i64) -> Option<NonceAge> {
        if nonce.len() != NONCE_LEN {
            return None;
        }

        let tick = self.tick(now);
        if self.matches(nonce, tick, action, actor) {
            return Some(NonceAge::Fresh);
        }
        if self.matches(nonce, tick - 1, action, actor) {
            return Some(NonceAge::Aging);
        }
        None
    }

    fn matches(&self, nonce: &str, tick: i64, action: &str, actor: &Actor) -> bool {
        let expected = self.digest(tick, action, actor);
        expected.as_bytes().ct_eq(nonce.as_bytes()).into()
    }

    fn tick(&self, now: i64) -> i64 {
        let half = (self.lifetime_secs / 2) as i64;
        now.max(0).div_euclid(half) + 1
    }

    fn digest(&self, tick: i64, action: &str, actor: &Actor) -> String {
        // Keys of any length are accepted by HMAC
        let mut mac = match HmacSha256::new_from_slice(&self.secret) {
            Ok(mac) => mac,
            Err(_) => return String::new(),
        };
        mac.update(format!("{}|{}|{}|{}", tick, action, actor.user_id, actor.session).as_bytes());
        let hex = hex::encode(mac.finalize().into_bytes());
        hex[hex.len() - 12..hex.len() - 2].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Role;

    const ACTION: &str = "bdd_delete_nonce_action";
    const DAY: i64 = 86400;

    fn admin() -> Actor {
        Actor {
            user_id: 1,
            display_name: "Admin".to_string(),
            role: Some(Role::Administrator),
            session: "session-a".to_string(),
        }
    }

    fn issuer() -> NonceIssuer {
        NonceIssuer::new("test-secret", DAY as u64)
    }

    #[test]
    fn test_fresh_token_verifies() {
        let issuer = issuer();
        let now = 1_700_000_000;
        let nonce = issuer.issue_at(ACTION, &admin(), now);
        assert_eq!(nonce.len(), NONCE_LEN);
        assert_eq!(issuer.verify_at(&nonce, ACTION, &admin(), now), Some(NonceAge::Fresh));
    }

    #[test]
    fn test_token_ages_then_expires() {
        let issuer = issuer();
        let now = 1_700_000_000;
        let nonce = issuer.issue_at(ACTION, &admin(), now);

        assert_eq!(
            issuer.verify_at(&nonce, ACTION, &admin(), now + DAY / 2),
            Some(NonceAge::Aging)
        );
        assert_eq!(issuer.verify_at(&nonce, ACTION, &admin(), now + DAY + DAY / 2), None);
    }

    #[test]
    fn test_token_is_bound_to_action_user_and_session() {
        let issuer = issuer();
        let now = 1_700_000_000;
        let nonce = issuer.issue_at(ACTION, &admin(), now);

        assert_eq!(issuer.verify_at(&nonce, "other_action", &admin(), now), None);

        let mut other_user = admin();
        other_user.user_id = 2;
        assert_eq!(issuer.verify_at(&nonce, ACTION, &other_user, now), None);

        let mut other_session = admin();
        other_session.session = "session-b".to_string();
        assert_eq!(issuer.verify_at(&nonce, ACTION, &other_session, now), None);
    }

    #[test]
    fn test_secret_changes_tokens() {
        let now = 1_700_000_000;
        let a = issuer().issue_at(ACTION, &admin(), now);
        let b = NonceIssuer::new("another-secret", DAY as u64).issue_at(ACTION, &admin(), now);
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let issuer = issuer();
        assert_eq!(issuer.verify("", ACTION, &admin()), None);
        assert_eq!(issuer.verify("0123456789abcdef", ACTION, &admin()), None);
    }
}
