//! # Cairn Server
//!
//! HTTP host for the Cairn CMS core.
//!
//! ## Endpoints
//!
//! - `GET /v1/sys/health` - liveness, unauthenticated
//! - `GET /v1/auth/whoami` - the authenticated principal
//! - `GET /v1/sys/plugins` - started plugins and their configuration status (admin)
//!
//! Every route except health runs behind [`auth::require_auth`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod config;
pub mod error;
pub mod plugins;
pub mod routes;

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use cairn_auth::Authenticator;
use cairn_plugins::{PluginHost, PluginReport};
use cairn_storage::{DocumentStore, MemoryStore};
use cairn_storage_sqlite::SqliteDocumentStore;

pub use config::ServerConfig;
pub use error::{ApiError, ServerError};
pub use plugins::{AuditConfig, AuditSwitch, AuthAuditPlugin, CorePlugin};

/// Name of the SQLite database under the data directory.
pub const DATABASE_NAME: &str = "cairn";

/// Shared request state.
#[derive(Clone)]
pub struct AppState {
    /// Credential validator.
    pub authenticator: Arc<Authenticator>,
    /// Startup report of every plugin.
    pub plugins: Arc<Vec<PluginReport>>,
    /// Success audit switch, driven by [`AuthAuditPlugin`].
    pub audit: AuditSwitch,
}

/// Opens the document store, starts the built-in plugins, and builds the
/// authenticator.
///
/// # Errors
///
/// Fails if the store cannot be opened, the introspector cannot be built, or
/// any plugin fails to bootstrap.
pub async fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    let store: Arc<dyn DocumentStore> = if config.dev {
        warn!("Development mode enabled, documents are kept in memory");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(SqliteDocumentStore::open(&config.data_dir, DATABASE_NAME).await?)
    };

    let authenticator = Authenticator::new(&config.auth_config(), config.introspector()?);

    let audit = AuditSwitch::default();
    let mut host = PluginHost::new();
    host.register(Box::new(CorePlugin))?;
    host.register(Box::new(AuthAuditPlugin::new(audit.clone())))?;

    let plugins = host.start(store.as_ref()).await?;
    info!(count = plugins.len(), "Plugins started");

    Ok(AppState {
        authenticator: Arc::new(authenticator),
        plugins: Arc::new(plugins),
        audit,
    })
}

/// Assembles the application router.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/v1/auth/whoami", get(routes::whoami))
        .route("/v1/sys/plugins", get(routes::plugins))
        .layer(from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        .route("/v1/sys/health", get(routes::health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
