//! Integration tests for the Cairn server.
//!
//! Each test starts the real router on an ephemeral port and talks to it over
//! HTTP.

// Allow unwrap() in tests - panics are acceptable for test assertions
#![allow(clippy::disallowed_methods)]

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::task::JoinHandle;

use cairn_server::{app, build_state, ServerConfig};

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct ClaimResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct WhoamiResponse {
    pub identity: String,
    pub roles: Vec<String>,
    pub scheme: String,
    pub claims: Vec<ClaimResponse>,
}

#[derive(Debug, Deserialize)]
pub struct PluginResponse {
    pub name: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct PluginsResponse {
    pub plugins: Vec<PluginResponse>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Test Server
// ============================================================================

/// A server instance running inside the test process.
pub struct TestServer {
    handle: JoinHandle<()>,
    pub base_url: String,
    pub addr: SocketAddr,
}

impl TestServer {
    /// Start a server for `config` on an ephemeral port.
    pub async fn start(config: ServerConfig) -> Result<Self> {
        let state = build_state(&config)
            .await
            .context("Failed to build server state")?;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind test listener")?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app(state)).await {
                eprintln!("test server on {addr} stopped: {e}");
            }
        });

        let server = Self {
            handle,
            base_url: format!("http://{addr}"),
            addr,
        };

        server.wait_for_ready().await?;

        Ok(server)
    }

    /// Wait for the server to be ready to accept connections.
    async fn wait_for_ready(&self) -> Result<()> {
        let client = Client::new();
        let url = format!("{}/v1/sys/health", self.base_url);

        for _ in 0..50 {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                _ => tokio::time::sleep(Duration::from_millis(20)).await,
            }
        }

        bail!("Server failed to start within 1 second")
    }

    /// Get an HTTP client for this server.
    pub fn client(&self) -> CairnClient {
        CairnClient::new(&self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ============================================================================
// Test Client
// ============================================================================

/// HTTP client for the Cairn API.
pub struct CairnClient {
    client: Client,
    base_url: String,
    authorization: Option<String>,
}

impl CairnClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.to_string(),
            authorization: None,
        }
    }

    pub fn with_api_key(self, key: &str) -> Self {
        self.with_authorization(&format!("ApiKey {key}"))
    }

    pub fn with_bearer(self, token: &str) -> Self {
        self.with_authorization(&format!("Bearer {token}"))
    }

    pub fn with_authorization(mut self, value: &str) -> Self {
        self.authorization = Some(value.to_string());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let mut req = self.client.get(self.url(path));
        if let Some(value) = &self.authorization {
            req = req.header(reqwest::header::AUTHORIZATION, value);
        }
        Ok(req.send().await?)
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        Ok(self.get("/v1/sys/health").await?.json().await?)
    }

    pub async fn whoami(&self) -> Result<WhoamiResponse> {
        let resp = self.get("/v1/auth/whoami").await?;
        if !resp.status().is_success() {
            bail!("Whoami failed: {}", resp.text().await?);
        }
        Ok(resp.json().await?)
    }

    /// Calls whoami expecting a rejection; returns the status and reason.
    pub async fn whoami_rejected(&self) -> Result<(StatusCode, String)> {
        let resp = self.get("/v1/auth/whoami").await?;
        let status = resp.status();
        if status.is_success() {
            bail!("Whoami unexpectedly succeeded");
        }
        let body: ErrorResponse = resp.json().await?;
        Ok((status, body.error))
    }

    pub async fn plugins(&self) -> Result<PluginsResponse> {
        let resp = self.get("/v1/sys/plugins").await?;
        if !resp.status().is_success() {
            bail!("List plugins failed ({}): {}", resp.status(), resp.text().await?);
        }
        Ok(resp.json().await?)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use tempfile::TempDir;

    const KEY: &str = "integration-key";
    const ADMIN_KEY: &str = "integration-admin-key";
    const JWT_SECRET: &str = "integration-jwt-secret";

    fn jwt_config() -> ServerConfig {
        let mut config = ServerConfig::dev(KEY, ADMIN_KEY);
        config.jwt_secret = Some(JWT_SECRET.to_string());
        config
    }

    fn mint(claims: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    #[tokio::test]
    async fn test_server_health_in_dev_mode() {
        let server = TestServer::start(ServerConfig::dev(KEY, ADMIN_KEY))
            .await
            .unwrap();

        let health = server.client().health().await.unwrap();

        assert_eq!(health.status, "ok");
        assert!(!health.version.is_empty());
    }

    #[tokio::test]
    async fn test_authentication_required() {
        let server = TestServer::start(ServerConfig::dev(KEY, ADMIN_KEY))
            .await
            .unwrap();

        let (status, reason) = server.client().whoami_rejected().await.unwrap();

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(reason, "no authorization header");
    }

    #[tokio::test]
    async fn test_api_keys_resolve_to_fixed_identities() {
        let server = TestServer::start(ServerConfig::dev(KEY, ADMIN_KEY))
            .await
            .unwrap();

        let standard = server.client().with_api_key(KEY).whoami().await.unwrap();
        assert_eq!(standard.identity, "ApiKeyUser");
        assert_eq!(standard.roles, vec!["Authenticated"]);
        assert_eq!(standard.scheme, "ApiKey");

        let admin = server
            .client()
            .with_authorization(&format!("apikey   {ADMIN_KEY}  "))
            .whoami()
            .await
            .unwrap();
        assert_eq!(admin.identity, "AdminApiKeyUser");
        assert_eq!(admin.roles, vec!["Admin", "Authenticated"]);
    }

    #[tokio::test]
    async fn test_invalid_api_key_rejected() {
        let server = TestServer::start(ServerConfig::dev(KEY, ADMIN_KEY))
            .await
            .unwrap();

        let (status, reason) = server
            .client()
            .with_api_key("not-the-key")
            .whoami_rejected()
            .await
            .unwrap();

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(reason, "api key not valid");
    }

    #[tokio::test]
    async fn test_unknown_scheme_rejected() {
        let server = TestServer::start(jwt_config()).await.unwrap();

        let (status, reason) = server
            .client()
            .with_authorization("Basic dXNlcjpwYXNz")
            .whoami_rejected()
            .await
            .unwrap();

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(reason, "no access token");
    }

    #[tokio::test]
    async fn test_bearer_jwt_flow() {
        let server = TestServer::start(jwt_config()).await.unwrap();
        let token = mint(json!({
            "sub": "user-42",
            "name": "alice",
            "role": ["Editor", "Authenticated"],
            "iss": "cairn",
            "aud": "cairn",
            "exp": now() + 300,
        }));

        let me = server.client().with_bearer(&token).whoami().await.unwrap();

        assert_eq!(me.identity, "alice");
        assert_eq!(me.scheme, "Bearer");
        assert_eq!(me.roles, vec!["Authenticated", "Editor"]);
        assert!(me
            .claims
            .iter()
            .any(|c| c.kind == "sub" && c.value == "user-42"));
    }

    #[tokio::test]
    async fn test_expired_bearer_rejected() {
        let server = TestServer::start(jwt_config()).await.unwrap();
        let token = mint(json!({
            "sub": "user-42",
            "iss": "cairn",
            "aud": "cairn",
            "exp": now() - 3600,
        }));

        let (status, reason) = server
            .client()
            .with_bearer(&token)
            .whoami_rejected()
            .await
            .unwrap();

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(reason, "token expired");
    }

    #[tokio::test]
    async fn test_bearer_without_subject_rejected() {
        let server = TestServer::start(jwt_config()).await.unwrap();
        let token = mint(json!({
            "role": "Editor",
            "iss": "cairn",
            "aud": "cairn",
            "exp": now() + 300,
        }));

        let (_, reason) = server
            .client()
            .with_bearer(&token)
            .whoami_rejected()
            .await
            .unwrap();

        assert_eq!(reason, "token carries no subject");
    }

    #[tokio::test]
    async fn test_plugins_listing_requires_admin() {
        let server = TestServer::start(ServerConfig::dev(KEY, ADMIN_KEY))
            .await
            .unwrap();

        let denied = server.client().with_api_key(KEY).plugins().await;
        assert!(denied.is_err());

        let listing = server
            .client()
            .with_api_key(ADMIN_KEY)
            .plugins()
            .await
            .unwrap();
        let names: Vec<_> = listing.plugins.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["cairn.core", "cairn.auth-audit"]);
        assert_eq!(listing.plugins[0].status, "skipped");
        assert_eq!(listing.plugins[1].status, "created");
    }

    #[tokio::test]
    async fn test_plugin_configuration_survives_restart() {
        let data_dir = TempDir::new().unwrap();
        let mut config = ServerConfig::dev(KEY, ADMIN_KEY);
        config.dev = false;
        config.data_dir = data_dir.path().to_path_buf();

        let first = TestServer::start(config.clone()).await.unwrap();
        let listing = first
            .client()
            .with_api_key(ADMIN_KEY)
            .plugins()
            .await
            .unwrap();
        assert_eq!(listing.plugins[1].status, "created");
        drop(first);

        let second = TestServer::start(config).await.unwrap();
        let listing = second
            .client()
            .with_api_key(ADMIN_KEY)
            .plugins()
            .await
            .unwrap();
        assert_eq!(listing.plugins[1].status, "existing");
    }
}
