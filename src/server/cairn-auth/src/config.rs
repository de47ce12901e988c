//! Authenticator configuration.

use std::time::Duration;

use zeroize::Zeroizing;

/// Identity bound to the standard API key.
pub const DEFAULT_STANDARD_IDENTITY: &str = "ApiKeyUser";
/// Identity bound to the admin API key.
pub const DEFAULT_ADMIN_IDENTITY: &str = "AdminApiKeyUser";
/// Upper bound on a single token introspection.
pub const DEFAULT_INTROSPECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings consumed by [`Authenticator`](crate::Authenticator).
///
/// An empty key disables that key; with both empty, every API-key attempt
/// fails.
#[derive(Clone)]
pub struct AuthConfig {
    /// Standard API key (grants `Authenticated`).
    pub api_key: Zeroizing<String>,
    /// Admin API key (grants `Authenticated` and `Admin`).
    pub admin_api_key: Zeroizing<String>,
    /// Identity of callers presenting the standard key.
    pub standard_identity: String,
    /// Identity of callers presenting the admin key.
    pub admin_identity: String,
    /// Upper bound on a single token introspection.
    pub introspection_timeout: Duration,
}

impl AuthConfig {
    /// Creates a configuration with the given keys and default identities.
    pub fn with_api_keys(api_key: impl Into<String>, admin_api_key: impl Into<String>) -> Self {
        Self {
            api_key: Zeroizing::new(api_key.into()),
            admin_api_key: Zeroizing::new(admin_api_key.into()),
            ..Self::default()
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: Zeroizing::new(String::new()),
            admin_api_key: Zeroizing::new(String::new()),
            standard_identity: DEFAULT_STANDARD_IDENTITY.to_string(),
            admin_identity: DEFAULT_ADMIN_IDENTITY.to_string(),
            introspection_timeout: DEFAULT_INTROSPECTION_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn redact(secret: &str) -> &'static str {
            if secret.is_empty() {
                "<unset>"
            } else {
                "<redacted>"
            }
        }

        f.debug_struct("AuthConfig")
            .field("api_key", &redact(&self.api_key))
            .field("admin_api_key", &redact(&self.admin_api_key))
            .field("standard_identity", &self.standard_identity)
            .field("admin_identity", &self.admin_identity)
            .field("introspection_timeout", &self.introspection_timeout)
            .finish()
    }
}
