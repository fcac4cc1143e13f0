//! Acting-user identity for audit stamping.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// The identity of the user performing a mutation.
///
/// Supplied by the caller (the identity layer is an external collaborator);
/// the core never authenticates this value, it only stamps it onto movement
/// records and audit fields. Threaded explicitly through every mutating
/// command instead of being read from ambient global state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    /// Create an actor identity. The value must be non-blank.
    pub fn new(id: impl Into<String>) -> DomainResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::validation("actor cannot be blank"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Actor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
