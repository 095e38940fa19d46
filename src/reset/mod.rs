//! Signed password-reset tokens.
//!
//! A reset token is a self-contained HS256 JWT binding a user id to a
//! bounded validity window. Nothing is persisted at issuance; redemption is
//! made single-use by remembering consumed token ids until their own expiry.

use chrono::{Duration, Utc};
use dashmap::DashMap;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

/// Claims carried by a reset token.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ResetClaims {
    /// User id the token authorizes a password change for.
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// Token id, consumed at redemption.
    pub jti: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTokenError {
    /// Signature is fine but the validity window has passed.
    Expired,
    /// Bad signature, malformed payload, or anything else.
    Invalid,
}

/// Issue a reset token for a user, valid for `ttl_minutes`.
pub fn issue_reset_token(
    secret: &str,
    user_id: &str,
    ttl_minutes: i64,
) -> anyhow::Result<String> {
    let now = Utc::now();
    let claims = ResetClaims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(ttl_minutes)).timestamp(),
        jti: uuid::Uuid::new_v4().to_string(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// Verify signature and expiry, distinguishing an expired token from every
/// other failure mode.
pub fn verify_reset_token(secret: &str, token: &str) -> Result<ResetClaims, ResetTokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    match decode::<ResetClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => Ok(data.claims),
        Err(e) => match e.kind() {
            ErrorKind::ExpiredSignature => Err(ResetTokenError::Expired),
            _ => Err(ResetTokenError::Invalid),
        },
    }
}

/// Redeemed token ids, kept until the token would have expired anyway.
pub struct ConsumedTokens {
    entries: DashMap<String, i64>,
}

impl ConsumedTokens {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Mark a token as redeemed. Returns false if it was already consumed;
    /// the insert arbitrates concurrent redemptions of the same token.
    pub fn consume(&self, claims: &ResetClaims) -> bool {
        self.entries.insert(claims.jti.clone(), claims.exp).is_none()
    }

    /// Drop entries whose token has expired on its own; returns how many
    /// were removed.
    pub fn prune_expired(&self) -> usize {
        let now = Utc::now().timestamp();
        let before = self.entries.len();
        self.entries.retain(|_, exp| *exp > now);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for ConsumedTokens {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_round_trip() {
        let token = issue_reset_token(SECRET, "user-42", 60).unwrap();
        let claims = verify_reset_token(SECRET, &token).unwrap();

        assert_eq!(claims.sub, "user-42");
        assert!(claims.exp > claims.iat);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_expired_token() {
        let token = issue_reset_token(SECRET, "user-42", -5).unwrap();
        assert_eq!(
            verify_reset_token(SECRET, &token),
            Err(ResetTokenError::Expired)
        );
    }

    #[test]
    fn test_wrong_secret() {
        let token = issue_reset_token(SECRET, "user-42", 60).unwrap();
        assert_eq!(
            verify_reset_token("other-secret", &token),
            Err(ResetTokenError::Invalid)
        );
    }

    #[test]
    fn test_garbage_token() {
        assert_eq!(
            verify_reset_token(SECRET, "not.a.jwt"),
            Err(ResetTokenError::Invalid)
        );
        assert_eq!(verify_reset_token(SECRET, ""), Err(ResetTokenError::Invalid));
    }

    #[test]
    fn test_tampered_signature() {
        let mut tampered = issue_reset_token(SECRET, "user-42", 60).unwrap();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert_eq!(
            verify_reset_token(SECRET, &tampered),
            Err(ResetTokenError::Invalid)
        );
    }

    #[test]
    fn test_consume_is_single_use() {
        let consumed = ConsumedTokens::new();
        let token = issue_reset_token(SECRET, "user-42", 60).unwrap();
        let claims = verify_reset_token(SECRET, &token).unwrap();

        assert!(consumed.consume(&claims));
        assert!(!consumed.consume(&claims));
    }

    #[test]
    fn test_distinct_tokens_consume_independently() {
        let consumed = ConsumedTokens::new();
        let a = verify_reset_token(SECRET, &issue_reset_token(SECRET, "u1", 60).unwrap()).unwrap();
        let b = verify_reset_token(SECRET, &issue_reset_token(SECRET, "u1", 60).unwrap()).unwrap();

        assert!(consumed.consume(&a));
        assert!(consumed.consume(&b));
    }

    #[test]
    fn test_prune_drops_only_expired_entries() {
        let consumed = ConsumedTokens::new();
        let now = Utc::now().timestamp();

        let stale = ResetClaims {
            sub: "u1".to_string(),
            iat: now - 7200,
            exp: now - 3600,
            jti: "stale".to_string(),
        };
        let live = ResetClaims {
            sub: "u1".to_string(),
            iat: now,
            exp: now + 3600,
            jti: "live".to_string(),
        };

        consumed.consume(&stale);
        consumed.consume(&live);
        assert_eq!(consumed.prune_expired(), 1);
        assert_eq!(consumed.len(), 1);
    }
}
