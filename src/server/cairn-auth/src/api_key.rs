//! Static API key resolution.
//!
//! Two pre-shared keys, each bound to a fixed identity and role set. Keys
//! are compared locally without any network call.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::warn;
use zeroize::Zeroizing;

use crate::config::{DEFAULT_ADMIN_IDENTITY, DEFAULT_STANDARD_IDENTITY};
use crate::principal::{ROLE_ADMIN, ROLE_AUTHENTICATED};
use crate::{AuthConfig, AuthError, Principal};

/// Resolves presented API keys to principals.
pub struct ApiKeyResolver {
    standard_key: Zeroizing<String>,
    admin_key: Zeroizing<String>,
    standard_identity: String,
    admin_identity: String,
}

impl ApiKeyResolver {
    /// Creates a resolver from the authenticator configuration.
    ///
    /// A blank identity falls back to its default, so a resolved principal
    /// always has a non-empty identity.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            standard_key: config.api_key.clone(),
            admin_key: config.admin_api_key.clone(),
            standard_identity: identity_or_default(
                &config.standard_identity,
                DEFAULT_STANDARD_IDENTITY,
            ),
            admin_identity: identity_or_default(&config.admin_identity, DEFAULT_ADMIN_IDENTITY),
        }
    }

    /// Returns true if at least one key is configured.
    pub fn is_enabled(&self) -> bool {
        !self.standard_key.is_empty() || !self.admin_key.is_empty()
    }

    /// Resolves a presented key.
    ///
    /// The standard key is checked first, so if both keys are configured to
    /// the same value the standard identity wins.
    pub fn resolve(&self, presented: &str) -> Result<Principal, AuthError> {
        if key_matches(&self.standard_key, presented) {
            return Ok(Principal::api_key(
                &self.standard_identity,
                &[ROLE_AUTHENTICATED],
            ));
        }

        if key_matches(&self.admin_key, presented) {
            return Ok(Principal::api_key(
                &self.admin_identity,
                &[ROLE_AUTHENTICATED, ROLE_ADMIN],
            ));
        }

        Err(AuthError::InvalidApiKey)
    }
}

fn identity_or_default(identity: &str, default: &str) -> String {
    let identity = identity.trim();
    if identity.is_empty() {
        warn!(default = %default, "Blank API-key identity configured, using default");
        return default.to_string();
    }
    identity.to_string()
}

/// Compares SHA-256 digests of both keys in constant time. An unset key
/// never matches.
fn key_matches(configured: &str, presented: &str) -> bool {
    if configured.is_empty() {
        return false;
    }
    let configured = Sha256::digest(configured.as_bytes());
    let presented = Sha256::digest(presented.as_bytes());
    configured.as_slice().ct_eq(presented.as_slice()).into()
}
