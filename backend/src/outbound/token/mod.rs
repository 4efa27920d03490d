//! JWT bearer tokens carrying an identity snapshot.
//!
//! The payload embeds the user fields captured at issue time; validation
//! recovers that snapshot without touching the credential store, so a
//! role change only takes effect once the holder obtains a new token.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{Error, Identity, Role};

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    jti: String,
    sub: i32,
    username: String,
    #[serde(rename = "fullName")]
    full_name: String,
    role: Role,
    iat: i64,
    exp: i64,
}

/// HMAC-signed token issuer and validator.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl JwtTokenService {
    /// Create a service signing with `secret`, issuing tokens valid for
    /// `ttl_days`.
    pub fn new(secret: &[u8], ttl_days: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs: ttl_days * SECONDS_PER_DAY,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, identity: &Identity) -> Result<String, Error> {
        let now = now_secs();
        let claims = Claims {
            jti: uuid::Uuid::new_v4().to_string(),
            sub: identity.id,
            username: identity.username.clone(),
            full_name: identity.full_name.clone(),
            role: identity.role,
            iat: now,
            exp: now + self.ttl_secs,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| Error::internal(format!("token signing failed: {err}")))
    }

    fn validate(&self, token: &str) -> Result<Identity, TokenError> {
        let data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())
                .map_err(|err| match err.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid,
                })?;
        let claims = data.claims;
        Ok(Identity {
            id: claims.sub,
            username: claims.username,
            full_name: claims.full_name,
            role: claims.role,
        })
    }
}

fn now_secs() -> i64 {
    i64::try_from(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
    )
    .unwrap_or(i64::MAX)
}
