use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, EntityId};

/// Customer identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub EntityId);

impl CustomerId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Registration payload for a customer.
///
/// Constructed through [`NewCustomer::new`], which performs the structural
/// checks; the id and timestamp are assigned by the owning store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
}

impl NewCustomer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        let email = email.into();

        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        if email.trim().is_empty() {
            return Err(DomainError::validation("email cannot be empty"));
        }

        // Note: email uniqueness requires infrastructure support (checking the
        // customer store). At this level we can only enforce shape.

        Ok(Self { name, email })
    }
}
