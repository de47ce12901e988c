//! Request authentication middleware.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, info};

use cairn_auth::AuthError;

use crate::{ApiError, AppState};

/// Validates the `Authorization` header and stores the resulting
/// [`Principal`](cairn_auth::Principal) in the request extensions.
///
/// Rejected requests get 401 with the failure reason.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => match std::str::from_utf8(value.as_bytes()) {
            Ok(value) => Some(value.to_owned()),
            Err(_) => {
                debug!(path = %req.uri().path(), "Authorization header is not UTF-8");
                return Err(ApiError::Unauthorized(AuthError::MalformedHeader.to_string()));
            },
        },
        None => None,
    };

    let outcome = state
        .authenticator
        .authenticate(authorization.as_deref())
        .await
        .into_result();

    match outcome {
        Ok(principal) => {
            if state.audit.enabled() {
                info!(
                    identity = %principal.identity,
                    scheme = ?principal.scheme,
                    path = %req.uri().path(),
                    "Authentication succeeded"
                );
            }
            req.extensions_mut().insert(principal);
            Ok(next.run(req).await)
        },
        Err(reason) => {
            debug!(path = %req.uri().path(), reason = %reason, "Request rejected");
            Err(ApiError::Unauthorized(reason.to_string()))
        },
    }
}
