//! JWT claims model and HS256 codec.
//!
//! Session management lives outside this system; the core only consumes
//! short-lived bearer tokens carrying an account id and its role.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use corpcredit_core::AccountId;

use crate::gate::AuthError;
use crate::roles::Role;

/// Claims carried by a bearer token once signature-verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the acting account.
    pub sub: AccountId,

    /// Role granted to the subject (mirrors the stored account role).
    pub role: Role,

    /// Issued-at (seconds since epoch).
    pub iat: i64,

    /// Expiration (seconds since epoch), validated on decode.
    pub exp: i64,
}

impl Claims {
    pub fn new(sub: AccountId, role: Role, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub,
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// HS256 encode/decode for [`Claims`].
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|_| AuthError::InvalidToken)
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        let claims = Claims::new(AccountId::new(), Role::Employee, Utc::now(), Duration::minutes(10));

        let token = codec.encode(&claims).unwrap();
        let decoded = codec.decode(&token).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn rejects_wrong_secret() {
        let codec = Hs256TokenCodec::new(b"right");
        let other = Hs256TokenCodec::new(b"wrong");
        let claims = Claims::new(AccountId::new(), Role::Admin, Utc::now(), Duration::minutes(10));

        let token = codec.encode(&claims).unwrap();
        assert_eq!(other.decode(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn rejects_expired_token() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        let issued = Utc::now() - Duration::hours(2);
        let claims = Claims::new(AccountId::new(), Role::Vendor, issued, Duration::minutes(10));

        let token = codec.encode(&claims).unwrap();
        assert_eq!(codec.decode(&token), Err(AuthError::InvalidToken));
    }
}
