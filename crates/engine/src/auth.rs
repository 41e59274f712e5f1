//! Credentials and bearer tokens.
//!
//! Passwords are bcrypt hashes; tokens are HS256 JWTs carrying the user id,
//! email and role.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, users::Role};

/// Default token lifetime: seven days.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Claims carried by every token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Signing configuration handed to the engine builder.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub bcrypt_cost: u32,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Issues and verifies tokens with a shared secret.
pub(crate) struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenIssuer {
    pub(crate) fn new(config: &AuthConfig) -> ResultEngine<Self> {
        if config.jwt_secret.is_empty() {
            return Err(EngineError::InvalidInput(
                "jwt secret must not be empty".to_string(),
            ));
        }
        if config.token_ttl_secs <= 0 {
            return Err(EngineError::InvalidInput(
                "token ttl must be positive".to_string(),
            ));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_secs: config.token_ttl_secs,
        })
    }

    pub(crate) fn issue(&self, id: i32, email: &str, role: Role) -> ResultEngine<String> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            id,
            email: email.to_string(),
            role,
            iat,
            exp: iat + self.ttl_secs,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| EngineError::Internal(format!("token signing failed: {err}")))
    }

    pub(crate) fn verify(&self, token: &str) -> ResultEngine<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| EngineError::Token(err.to_string()))
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

/// Hashes `password` on the blocking pool.
pub async fn hash_password(password: &str, cost: u32) -> ResultEngine<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|err| EngineError::Internal(err.to_string()))?
        .map_err(|err| EngineError::Internal(format!("password hashing failed: {err}")))
}

/// Hashed at build time and checked when a login names an unknown email, so
/// both rejections cost one bcrypt verification.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

pub(crate) async fn decoy_hash(cost: u32) -> ResultEngine<String> {
    hash_password(DECOY_PASSWORD, cost).await
}

/// `false` for a wrong password and for a malformed stored hash.
pub(crate) async fn verify_password(password: &str, hash: &str) -> ResultEngine<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|err| EngineError::Internal(err.to_string()))?;
    Ok(verified.unwrap_or(false))
}
