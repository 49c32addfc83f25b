use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use huntseed_core::Secret;

use crate::errors::GenerationError;

/// Claims carried by a session's access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs HS256 access tokens that were issued a week before the run and
/// expired an hour later, so clients go straight to the refresh path.
pub struct SessionTokenMinter {
    header: Header,
    key: EncodingKey,
}

impl SessionTokenMinter {
    pub fn new(secret: &Secret) -> Result<Self, GenerationError> {
        if secret.is_empty() {
            return Err(GenerationError::InvalidOptions(
                "jwt secret must not be empty".to_string(),
            ));
        }
        Ok(Self {
            header: Header::new(Algorithm::HS256),
            key: EncodingKey::from_secret(secret.expose().as_bytes()),
        })
    }

    pub fn claims(user_id: u64, now: DateTime<Utc>) -> AccessClaims {
        let issued_at = now - TimeDelta::days(7);
        AccessClaims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + TimeDelta::hours(1)).timestamp(),
        }
    }

    pub fn mint(&self, user_id: u64, now: DateTime<Utc>) -> Result<String, GenerationError> {
        let claims = Self::claims(user_id, now);
        Ok(jsonwebtoken::encode(&self.header, &claims, &self.key)?)
    }
}

/// Check the signature of `token` and return its claims, accepting expired
/// tokens.
pub fn decode_expired(token: &str, secret: &Secret) -> Result<AccessClaims, GenerationError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    let data = jsonwebtoken::decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.expose().as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(
            SessionTokenMinter::new(&Secret::new("")),
            Err(GenerationError::InvalidOptions(_))
        ));
    }

    #[test]
    fn minted_token_is_already_expired() {
        let secret = Secret::new("test-secret");
        let now = DateTime::parse_from_rfc3339("2024-03-20T10:00:00Z")
            .expect("timestamp")
            .with_timezone(&Utc);
        let token = SessionTokenMinter::new(&secret)
            .expect("minter")
            .mint(42, now)
            .expect("token");

        let claims = decode_expired(&token, &secret).expect("decode");
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(claims.exp < now.timestamp());
        assert!(decode_expired(&token, &Secret::new("other")).is_err());
    }
}
