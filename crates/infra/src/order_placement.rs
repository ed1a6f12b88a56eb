//! Order placement pipeline (application-level orchestration).
//!
//! This module implements the **order creation workflow**: it validates the
//! buyer and the requested product set, reserves stock, persists the order,
//! and reconciles the returned lines against the stock actually removed.
//!
//! ## Placement Flow
//!
//! `OrderPlacement` implements this pipeline:
//!
//! ```text
//! OrderRequest
//!   ↓
//! 1. Validate request shape (lines present, positive quantities, distinct products)
//!   ↓
//! 2. Validate the customer exists
//!   ↓
//! 3. Fetch the complete product set (one batched lookup, keyed by id)
//!   ↓
//! 4. Validate stock for every line, then commit all deductions in one batch
//!   ↓
//! 5. Persist the order (restore stock if this fails)
//!   ↓
//! 6. Reconcile line quantities against observed stock movement
//! ```
//!
//! ## Why This Orchestration?
//!
//! - **Fail fast, mutate late**: every check that can reject the request runs
//!   before the single stock write; a request that cannot be fulfilled in
//!   full never changes any product.
//! - **Compose infrastructure**: the pipeline is generic over the three store
//!   traits, so it runs unchanged against in-memory stores in tests and real
//!   backends in production.
//! - **Error handling**: domain errors and store errors are mapped into one
//!   `OrderError` enum; every failure is terminal for the attempt (callers
//!   decide whether to resubmit, nothing here retries).
//!
//! ## Failure After the Decrement
//!
//! The stock deductions and the order row live behind separate store seams,
//! so there is no ambient transaction spanning both. If persisting the order
//! fails after the deductions committed, the pipeline compensates by writing
//! the pre-deduction quantities back (expecting the post-deduction versions).
//! A restore that fails too is logged at error level; stock and orders are
//! then inconsistent and need operator intervention.
//!
//! This module contains no IO itself; it composes the store traits.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use stockroom_core::{DomainError, ExpectedVersion};
use stockroom_customers::CustomerId;
use stockroom_orders::{NewOrder, Order, OrderLine, OrderRequest};
use stockroom_products::{Product, ProductId, StockUpdate};

use crate::store::{CustomerStore, OrderStore, ProductStore, StoreError};

/// Order placement failure.
///
/// Every variant is terminal: the attempt is over, nothing was retried, and
/// (except for a failed stock restore, which is logged) no stock deduction
/// survives a failed placement.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request failed structural validation before any store was
    /// consulted.
    #[error("invalid order request: {0}")]
    Validation(String),

    /// The buying customer does not exist.
    #[error("customer {0} not found")]
    CustomerNotFound(CustomerId),

    /// One or more requested products do not exist.
    #[error("request references {} unknown products", missing.len())]
    InvalidProduct { missing: Vec<ProductId> },

    /// A line requested more units than the product has on hand.
    #[error(
        "insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u64,
        available: u64,
    },

    /// Stock changed concurrently between validation and reservation.
    #[error("stock reservation conflict: {0}")]
    Conflict(String),

    /// A store failed.
    #[error("order could not be completed: {0}")]
    Persistence(StoreError),
}

impl From<StoreError> for OrderError {
    fn from(value: StoreError) -> Self {
        match &value {
            StoreError::Conflict(msg) => OrderError::Conflict(msg.clone()),
            _ => OrderError::Persistence(value),
        }
    }
}

impl From<DomainError> for OrderError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => OrderError::Validation(msg),
            DomainError::InvariantViolation(msg) => OrderError::Validation(msg),
            DomainError::InvalidId(msg) => OrderError::Validation(msg),
        }
    }
}

/// The order creation workflow.
///
/// Collaborators are injected once at construction time; the pipeline holds
/// no other state, so one instance can serve any number of placements.
///
/// ## Generic Parameters
///
/// - `C`: customer store implementation
/// - `P`: product store implementation
/// - `O`: order store implementation
///
/// Using generics (rather than concrete types) keeps the pipeline testable
/// with in-memory stores and swappable with real backends without changing
/// domain code.
#[derive(Debug)]
pub struct OrderPlacement<C, P, O> {
    customers: C,
    products: P,
    orders: O,
}

impl<C, P, O> OrderPlacement<C, P, O> {
    pub fn new(customers: C, products: P, orders: O) -> Self {
        Self {
            customers,
            products,
            orders,
        }
    }
}

impl<C, P, O> OrderPlacement<C, P, O>
where
    C: CustomerStore,
    P: ProductStore,
    O: OrderStore,
{
    /// Place an order: validate, reserve stock, persist, reconcile.
    ///
    /// On success the returned [`Order`] is the persisted record with each
    /// line's quantity recomputed from the stock actually removed for that
    /// product (pre-deduction minus post-deduction), not taken on faith from
    /// the order store.
    ///
    /// Placement is **not** idempotent: resubmitting an identical request
    /// creates a second order and deducts stock again.
    pub fn place(&self, request: OrderRequest) -> Result<Order, OrderError> {
        // 1) Structural validation (no store calls yet)
        request.validate()?;

        debug!(
            customer_id = %request.customer_id,
            lines = request.items.len(),
            "placing order"
        );

        // 2) The customer must exist
        let customer = self
            .customers
            .find_by_id(request.customer_id)?
            .ok_or(OrderError::CustomerNotFound(request.customer_id))?;

        // 3) Fetch the complete product set in one batch, keyed by id
        let requested_ids: Vec<ProductId> =
            request.items.iter().map(|item| item.product_id).collect();
        let products: HashMap<ProductId, Product> = self
            .products
            .find_by_ids(&requested_ids)?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        // Request ids are distinct after validation, so a smaller fetched
        // set means some requested products do not exist.
        if products.len() != requested_ids.len() {
            let missing = requested_ids
                .iter()
                .copied()
                .filter(|id| !products.contains_key(id))
                .collect();
            return Err(OrderError::InvalidProduct { missing });
        }

        // 4) Validate stock for every line before mutating anything
        let mut updates = Vec::with_capacity(request.items.len());
        let mut lines = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let Some(product) = products.get(&item.product_id) else {
                // Unreachable after the size check; kept so a buggy store
                // cannot push the pipeline past validation.
                return Err(OrderError::InvalidProduct {
                    missing: vec![item.product_id],
                });
            };

            let update =
                product
                    .deduct(item.quantity)
                    .map_err(|_| OrderError::InsufficientStock {
                        product_id: product.id,
                        requested: item.quantity,
                        available: product.quantity,
                    })?;

            updates.push(update);
            lines.push(OrderLine {
                product_id: product.id,
                quantity: item.quantity,
                unit_price: product.unit_price,
            });
        }

        // 5) Commit every deduction in one all-or-nothing batch. This is the
        // only mutation of product state in the pipeline; a rival stock write
        // since step 3 fails the whole batch as a Conflict.
        let updated = self.products.update_quantities(updates)?;

        // 6) Persist the order. A failure here lands after the deductions
        // committed, so restore the original quantities before reporting it.
        let order = match self.orders.create(NewOrder {
            customer_id: customer.id,
            lines,
        }) {
            Ok(order) => order,
            Err(err) => {
                warn!(error = %err, "order persistence failed, restoring stock");
                self.restore_stock(&products, &updated);
                return Err(OrderError::Persistence(err));
            }
        };

        // 7) Reconcile line quantities against the stock actually removed
        let order = reconcile_lines(order, &products, &updated);

        info!(
            order_id = %order.id,
            customer_id = %order.customer_id,
            lines = order.lines.len(),
            "order placed"
        );

        Ok(order)
    }

    /// Compensating action: write the pre-deduction quantities back after a
    /// failed order persistence.
    ///
    /// Each restore expects the post-deduction version, so a rival write that
    /// landed since the commit fails the restore instead of being clobbered.
    fn restore_stock(&self, originals: &HashMap<ProductId, Product>, updated: &[Product]) {
        let restores: Vec<StockUpdate> = updated
            .iter()
            .filter_map(|after| {
                originals.get(&after.id).map(|before| StockUpdate {
                    product_id: after.id,
                    new_quantity: before.quantity,
                    expected: ExpectedVersion::Exact(after.version),
                })
            })
            .collect();

        if let Err(err) = self.products.update_quantities(restores) {
            error!(error = %err, "stock restore failed, stock and orders are inconsistent");
        }
    }
}

/// Impose the observed stock movement on the persisted lines.
///
/// The quantity each line reports is `pre-deduction stock - post-deduction
/// stock` for its product; a line whose movement cannot be derived (no
/// matching records, or stock that grew) keeps the stored value.
fn reconcile_lines(
    mut order: Order,
    originals: &HashMap<ProductId, Product>,
    updated: &[Product],
) -> Order {
    let after: HashMap<ProductId, u64> = updated.iter().map(|p| (p.id, p.quantity)).collect();

    for line in &mut order.lines {
        let before = originals.get(&line.product_id).map(|p| p.quantity);
        let now = after.get(&line.product_id).copied();
        if let (Some(before), Some(now)) = (before, now) {
            if let Some(removed) = before.checked_sub(now) {
                line.quantity = removed;
            }
        }
    }

    order
}
