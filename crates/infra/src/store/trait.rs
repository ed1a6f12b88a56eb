use std::sync::Arc;

use thiserror::Error;

use stockroom_customers::{Customer, CustomerId, NewCustomer};
use stockroom_orders::{NewOrder, Order, OrderId};
use stockroom_products::{NewProduct, Product, ProductId, StockUpdate};

/// Store operation error.
///
/// This enum represents errors that can occur when interacting with the
/// stores. These are **infrastructure errors** (storage, concurrency,
/// constraints) as opposed to domain errors (validation, invariants).
///
/// ## Error Categories
///
/// - **Conflict**: Optimistic concurrency check failed (version mismatch)
/// - **Duplicate**: A uniqueness constraint was violated (email, product name)
/// - **MissingRecord**: An update targeted a record that does not exist
/// - **InvalidUpdate**: Malformed update batch
/// - **Storage**: Backend failure (e.g. poisoned lock, unavailable backend)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Conflict(String),

    #[error("uniqueness violated: {0}")]
    Duplicate(String),

    #[error("update targets a missing record: {0}")]
    MissingRecord(String),

    #[error("invalid update: {0}")]
    InvalidUpdate(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Registered customers.
pub trait CustomerStore: Send + Sync {
    /// Register a customer, assigning its id and timestamp.
    ///
    /// Implementations must reject an already-registered email with
    /// [`StoreError::Duplicate`].
    fn create(&self, new: NewCustomer) -> Result<Customer, StoreError>;

    fn find_by_id(&self, customer_id: CustomerId) -> Result<Option<Customer>, StoreError>;
}

impl<S> CustomerStore for Arc<S>
where
    S: CustomerStore + ?Sized,
{
    fn create(&self, new: NewCustomer) -> Result<Customer, StoreError> {
        (**self).create(new)
    }

    fn find_by_id(&self, customer_id: CustomerId) -> Result<Option<Customer>, StoreError> {
        (**self).find_by_id(customer_id)
    }
}

/// Products and their tracked stock levels.
///
/// `update_quantities` is the only write path for stock and is **batched**:
/// the whole batch lands or none of it does. Optimistic locking via the
/// `expected` version on each [`StockUpdate`] (no pessimistic locks).
pub trait ProductStore: Send + Sync {
    /// Add a product to the catalog, assigning its id, timestamp, and
    /// initial version.
    ///
    /// Implementations must reject an already-used product name with
    /// [`StoreError::Duplicate`].
    fn create(&self, new: NewProduct) -> Result<Product, StoreError>;

    fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError>;

    /// Fetch a batch of products in one call.
    ///
    /// Returns the subset of requested products that exist; missing ids are
    /// omitted rather than reported as an error. Callers detect the mismatch
    /// by comparing sizes.
    fn find_by_ids(&self, product_ids: &[ProductId]) -> Result<Vec<Product>, StoreError>;

    /// Apply a batch of stock writes (all-or-nothing).
    ///
    /// Implementations must:
    /// - validate that every target exists and every `expected` version
    ///   matches the current record **before** mutating anything
    /// - bump each touched record's version
    /// - return the updated records in input order
    fn update_quantities(&self, updates: Vec<StockUpdate>) -> Result<Vec<Product>, StoreError>;
}

impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    fn create(&self, new: NewProduct) -> Result<Product, StoreError> {
        (**self).create(new)
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        (**self).find_by_name(name)
    }

    fn find_by_ids(&self, product_ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        (**self).find_by_ids(product_ids)
    }

    fn update_quantities(&self, updates: Vec<StockUpdate>) -> Result<Vec<Product>, StoreError> {
        (**self).update_quantities(updates)
    }
}

/// Persisted orders.
pub trait OrderStore: Send + Sync {
    /// Persist an order, assigning its id and timestamp. Lines are stored as
    /// given.
    fn create(&self, new: NewOrder) -> Result<Order, StoreError>;

    fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, StoreError>;
}

impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    fn create(&self, new: NewOrder) -> Result<Order, StoreError> {
        (**self).create(new)
    }

    fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, StoreError> {
        (**self).find_by_id(order_id)
    }
}
