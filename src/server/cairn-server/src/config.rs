//! Command-line and environment configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use cairn_auth::{
    AuthConfig, DisabledIntrospector, JwtConfig, JwtIntrospector, RemoteIntrospector,
    RemoteIntrospectorConfig, TokenIntrospector,
};

use crate::ServerError;

/// Server configuration.
#[derive(Parser, Clone)]
#[command(name = "cairn-server")]
#[command(about = "Cairn - headless CMS server")]
#[command(version)]
pub struct ServerConfig {
    /// Server bind address
    #[arg(long, default_value = "0.0.0.0:8080", env = "CAIRN_BIND_ADDRESS")]
    pub bind: String,

    /// Data directory for the document store
    #[arg(long, default_value = "data", env = "CAIRN_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Enable development mode (in-memory storage)
    #[arg(long, env = "CAIRN_DEV_MODE")]
    pub dev: bool,

    /// Standard API key
    #[arg(long, env = "CAIRN_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Admin API key
    #[arg(long, env = "CAIRN_ADMIN_API_KEY", default_value = "", hide_env_values = true)]
    pub admin_api_key: String,

    /// HS256 secret for locally validated bearer tokens
    #[arg(long, env = "CAIRN_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Expected JWT issuer
    #[arg(long, env = "CAIRN_JWT_ISSUER", default_value = "cairn")]
    pub jwt_issuer: String,

    /// Expected JWT audience
    #[arg(long, env = "CAIRN_JWT_AUDIENCE", default_value = "cairn")]
    pub jwt_audience: String,

    /// RFC 7662 token introspection endpoint
    #[arg(long, env = "CAIRN_INTROSPECTION_URL")]
    pub introspection_url: Option<String>,

    /// Client id presented to the introspection endpoint
    #[arg(long, env = "CAIRN_INTROSPECTION_CLIENT_ID", default_value = "cairn")]
    pub introspection_client_id: String,

    /// Client secret presented to the introspection endpoint
    #[arg(long, env = "CAIRN_INTROSPECTION_CLIENT_SECRET", hide_env_values = true)]
    pub introspection_client_secret: Option<String>,

    /// Upper bound on a single token introspection, in milliseconds
    #[arg(long, env = "CAIRN_INTROSPECTION_TIMEOUT_MS", default_value_t = 10_000)]
    pub introspection_timeout_ms: u64,
}

impl ServerConfig {
    /// Configuration for an in-memory server with the given API keys.
    pub fn dev(api_key: &str, admin_api_key: &str) -> Self {
        Self {
            bind: "127.0.0.1:0".to_string(),
            data_dir: PathBuf::from("data"),
            dev: true,
            api_key: api_key.to_string(),
            admin_api_key: admin_api_key.to_string(),
            jwt_secret: None,
            jwt_issuer: "cairn".to_string(),
            jwt_audience: "cairn".to_string(),
            introspection_url: None,
            introspection_client_id: "cairn".to_string(),
            introspection_client_secret: None,
            introspection_timeout_ms: 10_000,
        }
    }

    /// Upper bound on a single token introspection.
    pub fn introspection_timeout(&self) -> Duration {
        Duration::from_millis(self.introspection_timeout_ms)
    }

    /// Builds the authenticator settings.
    pub fn auth_config(&self) -> AuthConfig {
        let mut config = AuthConfig::with_api_keys(self.api_key.as_str(), self.admin_api_key.as_str());
        config.introspection_timeout = self.introspection_timeout();

        if self.api_key.is_empty() && self.admin_api_key.is_empty() {
            warn!("No API keys configured, API-key authentication is disabled");
        }

        config
    }

    /// Builds the bearer token introspector.
    ///
    /// A remote endpoint takes precedence over a local JWT secret; with
    /// neither, every bearer token is rejected.
    pub fn introspector(&self) -> Result<Arc<dyn TokenIntrospector>, ServerError> {
        if let Some(endpoint) = &self.introspection_url {
            let introspector = RemoteIntrospector::new(RemoteIntrospectorConfig {
                endpoint: endpoint.clone(),
                client_id: self.introspection_client_id.clone(),
                client_secret: self.introspection_client_secret.clone(),
                timeout: self.introspection_timeout(),
            })?;
            info!(endpoint = %endpoint, "Bearer tokens validated by remote introspection");
            return Ok(Arc::new(introspector));
        }

        if let Some(secret) = &self.jwt_secret {
            info!(issuer = %self.jwt_issuer, audience = %self.jwt_audience, "Bearer tokens validated as JWTs");
            return Ok(Arc::new(JwtIntrospector::new(JwtConfig {
                secret: secret.clone(),
                issuer: self.jwt_issuer.clone(),
                audience: self.jwt_audience.clone(),
            })));
        }

        warn!("No token introspection configured, bearer authentication is disabled");
        Ok(Arc::new(DisabledIntrospector))
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind", &self.bind)
            .field("data_dir", &self.data_dir)
            .field("dev", &self.dev)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("introspection_url", &self.introspection_url)
            .field("introspection_timeout_ms", &self.introspection_timeout_ms)
            .finish_non_exhaustive()
    }
}
