//! Local JWT token introspector.
//!
//! Validates HS256 tokens signed by the token issuer with a shared secret.

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{ClaimSet, IntrospectionError, TokenIntrospector};

/// Configuration for the JWT introspector.
#[derive(Clone)]
pub struct JwtConfig {
    /// JWT signing secret (shared with the token issuer).
    pub secret: String,
    /// Expected issuer (e.g., "https://id.example.com").
    pub issuer: String,
    /// Expected audience (e.g., "cairn").
    pub audience: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

/// Token introspector for locally verifiable JWTs.
///
/// Checks signature, issuer, audience, and expiry, then returns every claim
/// in the payload.
pub struct JwtIntrospector {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIntrospector {
    /// Creates a new JWT introspector.
    pub fn new(config: JwtConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        Self {
            decoding_key,
            validation,
        }
    }
}

#[async_trait]
impl TokenIntrospector for JwtIntrospector {
    async fn introspect(&self, token: &str) -> Result<ClaimSet, IntrospectionError> {
        let token_data =
            decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation).map_err(
                |e| match e.kind() {
                    ErrorKind::ExpiredSignature => IntrospectionError::TokenExpired,
                    kind => {
                        debug!(error = ?kind, "JWT rejected");
                        IntrospectionError::InvalidToken
                    },
                },
            )?;

        Ok(ClaimSet::from_json_object(&token_data.claims, &[]))
    }

    fn name(&self) -> &'static str {
        "jwt"
    }
}
