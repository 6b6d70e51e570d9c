use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role carried by a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Service,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Service => "service",
            Role::Admin => "admin",
        }
    }

    /// Whether a principal holding `self` meets a route requiring `required`.
    ///
    /// Any authenticated role meets a `User` requirement. `Service` and `Admin`
    /// are disjoint: neither implies the other.
    #[must_use]
    pub fn satisfies(self, required: Role) -> bool {
        match required {
            Role::User => true,
            Role::Service | Role::Admin => self == required,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown role string in a token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Accepts the identity store's spellings as well as our own.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" | "authenticated" => Ok(Role::User),
            "service" | "service_role" => Ok(Role::Service),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Authenticated identity, rebuilt per request from verified claims.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
    /// Every verified claim, as found in the token.
    pub claims: serde_json::Map<String, serde_json::Value>,
}

impl Principal {
    #[must_use]
    pub fn new(id: Uuid, role: Role) -> Self {
        Self {
            id,
            role,
            claims: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn with_claims(mut self, claims: serde_json::Map<String, serde_json::Value>) -> Self {
        self.claims = claims;
        self
    }

    #[must_use]
    pub fn claim_str(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(serde_json::Value::as_str)
    }

    /// Ownership check: a principal may only touch the resource keyed by its own id.
    #[must_use]
    pub fn owns(&self, resource_id: Uuid) -> bool {
        self.id == resource_id
    }
}
