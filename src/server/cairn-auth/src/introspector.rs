//! Token introspector trait.

use async_trait::async_trait;

use crate::{ClaimSet, IntrospectionError};

/// Trait for bearer token validators.
///
/// Implementations validate a token with its issuer and return the issuer's
/// claims on success. Claims are passed on to the principal unfiltered, so an
/// implementation must only return claims it trusts.
#[async_trait]
pub trait TokenIntrospector: Send + Sync {
    /// Validates the given token and returns its claims.
    ///
    /// # Returns
    ///
    /// * `Ok(ClaimSet)` - If the token is valid
    /// * `Err(IntrospectionError)` - If validation fails
    async fn introspect(&self, token: &str) -> Result<ClaimSet, IntrospectionError>;

    /// Returns the name of this introspector for logging/debugging.
    fn name(&self) -> &'static str;
}

/// Introspector used when no token issuer is configured.
///
/// Rejects every token.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledIntrospector;

#[async_trait]
impl TokenIntrospector for DisabledIntrospector {
    async fn introspect(&self, _token: &str) -> Result<ClaimSet, IntrospectionError> {
        Err(IntrospectionError::Disabled)
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_rejects_everything() {
        let result = DisabledIntrospector.introspect("anything").await;
        assert!(matches!(result, Err(IntrospectionError::Disabled)));
    }
}
