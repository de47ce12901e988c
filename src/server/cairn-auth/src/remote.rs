//! Remote token introspector (RFC 7662).
//!
//! Asks the token issuer's introspection endpoint whether a token is active
//! and returns the claims it reports.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::warn;

use crate::{ClaimSet, IntrospectionError, TokenIntrospector};

/// Configuration for the remote introspector.
#[derive(Clone)]
pub struct RemoteIntrospectorConfig {
    /// Introspection endpoint URL.
    pub endpoint: String,
    /// Client id used for HTTP basic authentication against the endpoint.
    pub client_id: String,
    /// Client secret used for HTTP basic authentication.
    pub client_secret: Option<String>,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for RemoteIntrospectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteIntrospectorConfig")
            .field("endpoint", &self.endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Token introspector backed by an RFC 7662 endpoint.
pub struct RemoteIntrospector {
    client: Client,
    config: RemoteIntrospectorConfig,
}

impl RemoteIntrospector {
    /// Creates a new remote introspector.
    pub fn new(config: RemoteIntrospectorConfig) -> Result<Self, IntrospectionError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| IntrospectionError::Unavailable(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl TokenIntrospector for RemoteIntrospector {
    async fn introspect(&self, token: &str) -> Result<ClaimSet, IntrospectionError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .basic_auth(&self.config.client_id, self.config.client_secret.as_ref())
            .form(&[("token", token), ("token_type_hint", "access_token")])
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = %self.config.endpoint, error = %e, "Introspection request failed");
                IntrospectionError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %self.config.endpoint, status = %status, "Introspection endpoint returned an error");
            return Err(IntrospectionError::Unavailable(format!("status {status}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| IntrospectionError::MalformedResponse(e.to_string()))?;

        let Value::Object(object) = body else {
            return Err(IntrospectionError::MalformedResponse(
                "response is not a JSON object".into(),
            ));
        };

        if object.get("active").and_then(Value::as_bool) != Some(true) {
            return Err(IntrospectionError::Inactive);
        }

        Ok(ClaimSet::from_json_object(&object, &["active"]))
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
