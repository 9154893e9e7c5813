//! Bearer token decoding.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use stockroom_core::UserId;

use crate::claims::{validate_claims, JwtClaims, TokenValidationError};

/// Verifies a raw bearer token and yields the claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;
}

/// Wire-level registered claims (numeric dates per RFC 7519).
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// HS256 validator over a shared secret.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: Vec<u8>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time-window checks are done deterministically in `validate_claims`
        // so they can be unit-tested with an injected clock.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "iat", "exp"]);

        Self {
            key: DecodingKey::from_secret(&secret),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        let decoded = jsonwebtoken::decode::<WireClaims>(token, &self.key, &self.validation)
            .map_err(|_| TokenValidationError::Malformed)?;

        let issued_at = Utc
            .timestamp_opt(decoded.claims.iat, 0)
            .single()
            .ok_or(TokenValidationError::Malformed)?;
        let expires_at = Utc
            .timestamp_opt(decoded.claims.exp, 0)
            .single()
            .ok_or(TokenValidationError::Malformed)?;

        let claims = JwtClaims {
            sub: UserId::new(decoded.claims.sub),
            issued_at,
            expires_at,
        };

        validate_claims(&claims, now)?;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};

    const SECRET: &[u8] = b"test-secret";

    fn mint(sub: &str, iat: i64, exp: i64) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &WireClaims {
                sub: sub.to_string(),
                iat,
                exp,
            },
            &EncodingKey::from_secret(SECRET),
        )
        .expect("failed to encode jwt")
    }

    fn validator() -> Hs256JwtValidator {
        Hs256JwtValidator::new(SECRET.to_vec())
    }

    #[test]
    fn round_trips_subject() {
        let now = Utc::now();
        let token = mint("u1", now.timestamp() - 60, now.timestamp() + 600);

        let claims = validator().validate(&token, now).unwrap();
        assert_eq!(claims.sub.as_str(), "u1");
    }

    #[test]
    fn rejects_wrong_secret() {
        let now = Utc::now();
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &WireClaims {
                sub: "u1".to_string(),
                iat: now.timestamp() - 60,
                exp: now.timestamp() + 600,
            },
            &EncodingKey::from_secret(b"other-secret"),
        )
        .unwrap();

        assert_eq!(
            validator().validate(&token, now),
            Err(TokenValidationError::Malformed)
        );
    }

    #[test]
    fn rejects_expired_token() {
        let now = Utc::now();
        let token = mint("u1", now.timestamp() - 600, now.timestamp() - 60);

        assert_eq!(
            validator().validate(&token, now),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            validator().validate("not-a-jwt", Utc::now()),
            Err(TokenValidationError::Malformed)
        );
    }
}
