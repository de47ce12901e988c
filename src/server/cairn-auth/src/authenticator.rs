//! `Authorization` header dispatcher.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::{
    ApiKeyResolver, AuthConfig, AuthError, AuthScheme, Principal, TokenIntrospector,
};

/// Scheme prefix for static API keys.
pub const API_KEY_PREFIX: &str = "ApiKey ";
/// Scheme prefix for bearer tokens.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Result of authenticating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The caller is authenticated.
    Success(Principal),
    /// The caller is not authenticated; `Display` gives the reason.
    Failure(AuthError),
}

impl AuthOutcome {
    /// Returns true for [`AuthOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the principal on success.
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Success(principal) => Some(principal),
            Self::Failure(_) => None,
        }
    }

    /// Returns the failure reason on failure.
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error.to_string()),
        }
    }

    /// Converts into a `Result`.
    pub fn into_result(self) -> Result<Principal, AuthError> {
        match self {
            Self::Success(principal) => Ok(principal),
            Self::Failure(error) => Err(error),
        }
    }
}

impl From<Result<Principal, AuthError>> for AuthOutcome {
    fn from(result: Result<Principal, AuthError>) -> Self {
        match result {
            Ok(principal) => Self::Success(principal),
            Err(error) => Self::Failure(error),
        }
    }
}

/// Validates `Authorization` header values.
///
/// Holds no mutable state; one instance is shared by all requests.
pub struct Authenticator {
    api_keys: ApiKeyResolver,
    introspector: Arc<dyn TokenIntrospector>,
    introspection_timeout: Duration,
}

impl Authenticator {
    /// Creates an authenticator.
    pub fn new(config: &AuthConfig, introspector: Arc<dyn TokenIntrospector>) -> Self {
        let api_keys = ApiKeyResolver::new(config);

        debug!(
            api_keys_enabled = api_keys.is_enabled(),
            introspector = introspector.name(),
            "Authenticator configured"
        );

        Self {
            api_keys,
            introspector,
            introspection_timeout: config.introspection_timeout,
        }
    }

    /// Authenticates one request from its raw `Authorization` header value.
    ///
    /// 1. Absent or empty header: `no authorization header`.
    /// 2. `ApiKey <key>` (case-insensitive): resolved against the configured
    ///    keys only, never as a bearer token.
    /// 3. `Bearer <token>` (case-insensitive): an empty token fails with
    ///    `no access token`; otherwise the introspector decides.
    /// 4. Any other scheme carries no usable token: `no access token`.
    pub async fn authenticate(&self, header: Option<&str>) -> AuthOutcome {
        let outcome = AuthOutcome::from(self.resolve(header).await);

        match &outcome {
            AuthOutcome::Success(principal) => debug!(
                identity = %principal.identity,
                scheme = ?principal.scheme,
                "Request authenticated"
            ),
            AuthOutcome::Failure(error) => debug!(reason = %error, "Authentication failed"),
        }

        outcome
    }

    async fn resolve(&self, header: Option<&str>) -> Result<Principal, AuthError> {
        let header = header
            .filter(|h| !h.is_empty())
            .ok_or(AuthError::MissingHeader)?;

        if let Some(key) = strip_scheme(header, API_KEY_PREFIX) {
            return self.api_keys.resolve(key.trim());
        }

        let token = strip_scheme(header, BEARER_PREFIX)
            .map(str::trim)
            .unwrap_or_default();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let claims = tokio::time::timeout(
            self.introspection_timeout,
            self.introspector.introspect(token),
        )
        .await
        .map_err(|_| AuthError::IntrospectionTimeout)?
        .map_err(|e| AuthError::Introspection(e.to_string()))?;

        Principal::from_claims(AuthScheme::Bearer, claims)
    }
}

/// Strips `prefix` from `header`, ignoring ASCII case.
fn strip_scheme<'a>(header: &'a str, prefix: &str) -> Option<&'a str> {
    let head = header.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        header.get(prefix.len()..)
    } else {
        None
    }
}
