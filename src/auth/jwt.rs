//! JWT token validation
//!
//! Token issuance belongs to the auth service; this validator verifies the
//! tokens it signs and turns them into an authenticated identity. `issue` is
//! provided for that service's contract and for tests.

use bson::oid::ObjectId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{PinboardError, Result};

/// JWT claims carried by every authenticated request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id (ObjectId hex)
    pub sub: String,
    pub username: String,
    /// Expiry (unix seconds)
    pub exp: u64,
    /// Issued at (unix seconds)
    pub iat: u64,
}

/// The authenticated identity handed to route handlers
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: ObjectId,
    pub username: String,
}

#[derive(Clone)]
pub struct JwtValidator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_seconds: u64,
}

impl JwtValidator {
    pub fn new(secret: &str, expiry_seconds: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_seconds,
        }
    }

    /// Sign a token for a user id. Returns (token, expires_at).
    pub fn issue(&self, user_id: ObjectId, username: &str) -> Result<(String, u64)> {
        let now = unix_now();
        let claims = Claims {
            sub: user_id.to_hex(),
            username: username.to_string(),
            exp: now + self.expiry_seconds,
            iat: now,
        };

        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| PinboardError::Auth(format!("Failed to sign token: {}", e)))?;

        Ok((token, claims.exp))
    }

    /// Verify a token and resolve the authenticated user
    pub fn verify(&self, token: &str) -> Result<AuthUser> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| PinboardError::Auth("Invalid or expired token".into()))?;

        let id = ObjectId::parse_str(&data.claims.sub)
            .map_err(|_| PinboardError::Auth("Invalid or expired token".into()))?;

        Ok(AuthUser {
            id,
            username: data.claims.username,
        })
    }
}

/// Pull the bearer token out of an Authorization header value
pub fn extract_token_from_header(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> JwtValidator {
        JwtValidator::new("test-secret", 3600)
    }

    #[test]
    fn issue_then_verify_round_trip() {
        let v = validator();
        let id = ObjectId::new();
        let (token, expires_at) = v.issue(id, "alice").unwrap();
        assert!(expires_at > unix_now());

        let user = v.verify(&token).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let (token, _) = validator().issue(ObjectId::new(), "alice").unwrap();
        let other = JwtValidator::new("different-secret", 3600);
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(validator().verify("not-a-jwt").is_err());
    }

    #[test]
    fn header_extraction() {
        assert_eq!(extract_token_from_header("Bearer abc"), Some("abc"));
        assert_eq!(extract_token_from_header("bearer abc"), Some("abc"));
        assert_eq!(extract_token_from_header("Basic abc"), None);
        assert_eq!(extract_token_from_header("Bearer "), None);
    }
}
