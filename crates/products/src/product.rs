use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, EntityId, ExpectedVersion};

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub EntityId);

impl ProductId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A product with its tracked stock level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
    /// Units currently on hand.
    pub quantity: u64,
    /// Bumped by the owning store on every stock write.
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product can cover a requested unit count.
    pub fn in_stock(&self, quantity: u64) -> bool {
        quantity <= self.quantity
    }

    /// Decide the stock write for removing `quantity` units.
    ///
    /// Pure: returns the pending write, never mutates the product. The write
    /// carries this record's version as its expectation, so it can only land
    /// on the state the decision was made against.
    pub fn deduct(&self, quantity: u64) -> DomainResult<StockUpdate> {
        let Some(remaining) = self.quantity.checked_sub(quantity) else {
            return Err(DomainError::invariant("stock cannot go negative"));
        };

        Ok(StockUpdate {
            product_id: self.id,
            new_quantity: remaining,
            expected: ExpectedVersion::Exact(self.version),
        })
    }
}

/// Creation payload for a product.
///
/// Constructed through [`NewProduct::new`]; the id, timestamp, and initial
/// version are assigned by the owning store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
    /// Initial units on hand.
    pub quantity: u64,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, unit_price: u64, quantity: u64) -> DomainResult<Self> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        if unit_price == 0 {
            return Err(DomainError::validation("unit_price must be positive"));
        }

        // Note: product name uniqueness requires infrastructure support
        // (checking the product store). At this level we can only enforce shape.

        Ok(Self {
            name,
            unit_price,
            quantity,
        })
    }
}

/// One product's pending stock write.
///
/// `new_quantity` is absolute, not a delta; `expected` is the version the
/// write was decided against.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StockUpdate {
    pub product_id: ProductId,
    pub new_quantity: u64,
    pub expected: ExpectedVersion,
}
