//! Session tokens: HS256 JWTs carrying just enough identity for the client
//! to stay logged in. Tokens expire 24 hours after issuance.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::model::{User, UserType};

/// Key used when `JWT_SECRET` is not configured. Fine for local development,
/// useless as a security guarantee; startup logs a warning when it is active.
pub const INSECURE_DEV_SECRET: &str = "rent-my-trip-dev-secret";

const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub user_type: UserType,
    pub iat: i64,
    pub exp: i64,
}

/// Pre-built signing/verification keys, shared across handlers.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    insecure_default: bool,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        JwtKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            insecure_default: secret == INSECURE_DEV_SECRET,
        }
    }

    pub fn is_insecure_default(&self) -> bool {
        self.insecure_default
    }

    pub fn sign(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: user.id.to_string(),
            email: user.email.clone(),
            user_type: user.user_type,
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &Validation::default()).map(|data| data.claims)
    }
}
