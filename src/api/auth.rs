use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::api::routes::AppState;
use crate::config::AuthConfig;
use crate::error::ApiError;

/// JWT claims: `sub` = identity-provider user id, `exp` (expiry), `iat` (issued at).
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

/// Authenticated user extracted from the Bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

const JWT_EXPIRY_HOURS: i64 = 24;

impl Claims {
    pub fn new(user_id: &str) -> Self {
        let now = chrono::Utc::now();
        let exp = (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp();
        Self {
            sub: user_id.to_string(),
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Issue an HS256 token. Used for local development and tests; production
/// tokens come from the identity provider.
pub fn create_token(secret: &[u8], user_id: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims::new(user_id);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
}

/// Verifies bearer tokens, either with a shared HS256 secret or with the
/// identity provider's ES256 public key.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn hs256(secret: &[u8]) -> Self {
        Self::with_key(DecodingKey::from_secret(secret), Algorithm::HS256)
    }

    pub fn es256_pem(pem: &[u8]) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self::with_key(DecodingKey::from_ec_pem(pem)?, Algorithm::ES256))
    }

    fn with_key(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        validation.validate_aud = false;
        Self { key, validation }
    }

    /// Require `iss` to be present and equal to `issuer`.
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self.validation.required_spec_claims.insert("iss".to_string());
        self
    }

    /// Require `aud` to be present and contain `audience`.
    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self.validation.required_spec_claims.insert("aud".to_string());
        self
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, jsonwebtoken::errors::Error> {
        let mut verifier = match &config.verification_key {
            Some(pem) => Self::es256_pem(pem.as_bytes())?,
            None => Self::hs256(config.jwt_secret.as_bytes()),
        };
        if let Some(issuer) = &config.issuer {
            verifier = verifier.with_issuer(issuer);
        }
        if let Some(audience) = &config.audience {
            verifier = verifier.with_audience(audience);
        }
        Ok(verifier)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(token_data.claims)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

        let claims = state.verifier.verify(token).map_err(|e| {
            tracing::debug!("token rejected: {}", e);
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })?;

        Ok(AuthUser { user_id: claims.sub })
    }
}
