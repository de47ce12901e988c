//! Authentication error types.

use thiserror::Error;

/// Reasons a credential is rejected.
///
/// The `Display` text is the human-readable failure reason handed back to
/// callers, so it must never include the presented secret or token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No `Authorization` header, or an empty one.
    #[error("no authorization header")]
    MissingHeader,

    /// The `Authorization` header bytes are not valid UTF-8.
    #[error("authorization header is not valid utf-8")]
    MalformedHeader,

    /// Bearer scheme with nothing after it, or an unrecognized scheme.
    #[error("no access token")]
    MissingToken,

    /// The presented API key matches neither configured key.
    #[error("api key not valid")]
    InvalidApiKey,

    /// The token introspector rejected the token; carries its message.
    #[error("{0}")]
    Introspection(String),

    /// The token introspector did not answer in time.
    #[error("token introspection timed out")]
    IntrospectionTimeout,

    /// The token was accepted but its claims name no identity.
    #[error("token carries no subject")]
    MissingSubject,
}

/// Errors reported by a token introspector.
#[derive(Debug, Error)]
pub enum IntrospectionError {
    /// Bad signature, wrong issuer or audience, or unparseable token.
    #[error("invalid token")]
    InvalidToken,

    /// Token has expired.
    #[error("token expired")]
    TokenExpired,

    /// The issuer reports the token as inactive.
    #[error("token is not active")]
    Inactive,

    /// The introspection endpoint could not be reached or failed.
    #[error("introspection endpoint unavailable: {0}")]
    Unavailable(String),

    /// The introspection endpoint answered with something unexpected.
    #[error("malformed introspection response: {0}")]
    MalformedResponse(String),

    /// No bearer token validation is configured.
    #[error("bearer authentication is not configured")]
    Disabled,
}
