//! HTTP handlers.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use cairn_auth::Principal;
use cairn_plugins::PluginReport;

use crate::{ApiError, AppState};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `ok` while the server is serving.
    pub status: &'static str,
    /// Server version.
    pub version: &'static str,
}

/// Plugin listing response.
#[derive(Debug, Serialize)]
pub struct PluginsResponse {
    /// Started plugins, in start order.
    pub plugins: Vec<PluginReport>,
}

/// `GET /v1/sys/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /v1/auth/whoami`
pub async fn whoami(Extension(principal): Extension<Principal>) -> Json<Principal> {
    Json(principal)
}

/// `GET /v1/sys/plugins` (admin only)
pub async fn plugins(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<PluginsResponse>, ApiError> {
    if !principal.is_admin() {
        return Err(ApiError::Forbidden("admin role required".into()));
    }

    Ok(Json(PluginsResponse {
        plugins: state.plugins.as_ref().clone(),
    }))
}
