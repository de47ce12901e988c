//! Authenticated principal and claim types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::AuthError;

/// Claim type carrying the display identity.
pub const CLAIM_NAME: &str = "name";
/// Claim type carrying the subject identifier.
pub const CLAIM_SUBJECT: &str = "sub";
/// Claim type carrying a role.
pub const CLAIM_ROLE: &str = "role";
/// Claim type carrying the identity of an API-key principal.
pub const CLAIM_NAME_IDENTIFIER: &str = "nameidentifier";

/// Role granted to every authenticated principal.
pub const ROLE_AUTHENTICATED: &str = "Authenticated";
/// Role granted to administrators.
pub const ROLE_ADMIN: &str = "Admin";

/// Scheme that authenticated the request.
///
/// Downstream authorization uses it to distinguish trust levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthScheme {
    /// Token validated by the token issuer.
    Bearer,
    /// Static pre-shared key.
    ApiKey,
}

/// A single `(type, value)` claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Claim type (e.g. `sub`, `role`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Claim value.
    pub value: String,
}

impl Claim {
    /// Creates a claim.
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// Ordered list of claims as returned by a token issuer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Vec<Claim>);

impl ClaimSet {
    /// Creates an empty claim set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a claim.
    pub fn push(&mut self, kind: impl Into<String>, value: impl Into<String>) {
        self.0.push(Claim::new(kind, value));
    }

    /// Iterates over the claims in order.
    pub fn iter(&self) -> impl Iterator<Item = &Claim> {
        self.0.iter()
    }

    /// Returns the value of the first claim of type `kind`.
    pub fn first<'a>(&'a self, kind: &str) -> Option<&'a str> {
        self.0
            .iter()
            .find(|c| c.kind == kind)
            .map(|c| c.value.as_str())
    }

    /// Returns every value of claims of type `kind`.
    pub fn values<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |c| c.kind == kind)
            .map(|c| c.value.as_str())
    }

    /// Number of claims.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no claims.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flattens a JSON claims object into a claim set.
    ///
    /// Strings are taken as-is, arrays yield one claim per element, other
    /// scalars and nested objects are rendered as JSON text. `null` values
    /// and the keys listed in `skip` are dropped.
    pub fn from_json_object(object: &Map<String, Value>, skip: &[&str]) -> Self {
        let mut claims = Self::new();
        for (kind, value) in object {
            if skip.contains(&kind.as_str()) {
                continue;
            }
            match value {
                Value::Array(items) => {
                    for item in items {
                        if let Some(text) = claim_text(item) {
                            claims.push(kind.as_str(), text);
                        }
                    }
                },
                other => {
                    if let Some(text) = claim_text(other) {
                        claims.push(kind.as_str(), text);
                    }
                },
            }
        }
        claims
    }
}

fn claim_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl FromIterator<Claim> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = Claim>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ClaimSet {
    type Item = Claim;
    type IntoIter = std::vec::IntoIter<Claim>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Authenticated caller.
///
/// Only built through [`Principal::from_claims`] or [`Principal::api_key`],
/// both of which guarantee a non-empty identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Username-like identity.
    pub identity: String,

    /// Granted roles.
    pub roles: BTreeSet<String>,

    /// Scheme that produced this principal.
    pub scheme: AuthScheme,

    /// Every claim attached to the identity, unfiltered.
    pub claims: ClaimSet,
}

impl Principal {
    /// Builds a principal from a token issuer's claims.
    ///
    /// The identity is the first `name` claim, falling back to `sub`. Roles
    /// are all `role` claim values. Every claim is kept verbatim.
    pub fn from_claims(scheme: AuthScheme, claims: ClaimSet) -> Result<Self, AuthError> {
        let identity = claims
            .first(CLAIM_NAME)
            .filter(|v| !v.is_empty())
            .or_else(|| claims.first(CLAIM_SUBJECT).filter(|v| !v.is_empty()))
            .ok_or(AuthError::MissingSubject)?
            .to_string();

        let roles = claims.values(CLAIM_ROLE).map(str::to_string).collect();

        Ok(Self {
            identity,
            roles,
            scheme,
            claims,
        })
    }

    /// Builds an API-key principal with a fixed identity and role set.
    pub(crate) fn api_key(identity: &str, roles: &[&str]) -> Self {
        let mut claims = ClaimSet::new();
        claims.push(CLAIM_NAME_IDENTIFIER, identity);
        for role in roles {
            claims.push(CLAIM_ROLE, *role);
        }

        Self {
            identity: identity.to_string(),
            roles: roles.iter().map(|r| (*r).to_string()).collect(),
            scheme: AuthScheme::ApiKey,
            claims,
        }
    }

    /// Checks whether the principal holds `role`.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Checks whether the principal holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }
}
