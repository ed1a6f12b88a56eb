use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, EntityId};
use stockroom_customers::CustomerId;
use stockroom_products::ProductId;

/// Order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub EntityId);

impl OrderId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// One requested line: product and unit count.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u64,
}

/// Input to order placement: who is buying, and what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub customer_id: CustomerId,
    pub items: Vec<OrderItem>,
}

impl OrderRequest {
    /// Structural checks, run before any collaborator is consulted.
    ///
    /// A request that passes has at least one line, only positive quantities,
    /// and distinct product ids; downstream correlation by product id relies
    /// on the distinctness.
    pub fn validate(&self) -> DomainResult<()> {
        if self.items.is_empty() {
            return Err(DomainError::validation("order must contain at least one line"));
        }

        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if item.quantity == 0 {
                return Err(DomainError::validation(format!(
                    "quantity for product {} must be positive",
                    item.product_id
                )));
            }

            if !seen.insert(item.product_id) {
                return Err(DomainError::validation(format!(
                    "product {} appears in more than one line",
                    item.product_id
                )));
            }
        }

        Ok(())
    }
}

/// Order line: product, quantity, unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u64,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
}

/// Persistence payload for an order whose lines have already been priced and
/// whose stock has been reserved; the id and timestamp are assigned by the
/// owning store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub lines: Vec<OrderLine>,
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Order total in smallest currency unit.
    ///
    /// Fails if a line amount or the running total overflows `u64`.
    pub fn total(&self) -> DomainResult<u64> {
        let mut total: u64 = 0;
        for line in &self.lines {
            let line_total = line
                .quantity
                .checked_mul(line.unit_price)
                .ok_or_else(|| DomainError::invariant("order line amount overflow"))?;
            total = total
                .checked_add(line_total)
                .ok_or_else(|| DomainError::invariant("order total overflow"))?;
        }
        Ok(total)
    }
}
