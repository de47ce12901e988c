//! # Cairn Auth
//!
//! Credential validation for Cairn.
//!
//! ## Supported Schemes
//!
//! - `ApiKey <key>`: two static pre-shared keys (standard and admin),
//!   resolved locally to fixed identities
//! - `Bearer <token>`: validated by a [`TokenIntrospector`], either locally
//!   ([`JwtIntrospector`]) or against an RFC 7662 endpoint
//!   ([`RemoteIntrospector`])
//!
//! [`Authenticator::authenticate`] never fails: every rejection is returned as
//! [`AuthOutcome::Failure`] so the caller can always render a response.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api_key;
pub mod authenticator;
pub mod config;
pub mod error;
pub mod introspector;
pub mod jwt;
pub mod principal;
pub mod remote;

pub use api_key::ApiKeyResolver;
pub use authenticator::{AuthOutcome, Authenticator};
pub use config::AuthConfig;
pub use error::{AuthError, IntrospectionError};
pub use introspector::{DisabledIntrospector, TokenIntrospector};
pub use jwt::{JwtConfig, JwtIntrospector};
pub use principal::{AuthScheme, Claim, ClaimSet, Principal};
pub use remote::{RemoteIntrospector, RemoteIntrospectorConfig};
