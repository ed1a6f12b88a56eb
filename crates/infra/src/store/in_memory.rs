use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use chrono::Utc;

use stockroom_core::EntityId;
use stockroom_customers::{Customer, CustomerId, NewCustomer};
use stockroom_orders::{NewOrder, Order, OrderId};
use stockroom_products::{NewProduct, Product, ProductId, StockUpdate};

use super::r#trait::{CustomerStore, OrderStore, ProductStore, StoreError};

fn poisoned() -> StoreError {
    StoreError::Storage("lock poisoned".to_string())
}

/// In-memory customer store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryCustomerStore {
    customers: RwLock<HashMap<CustomerId, Customer>>,
}

impl InMemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CustomerStore for InMemoryCustomerStore {
    fn create(&self, new: NewCustomer) -> Result<Customer, StoreError> {
        let mut customers = self.customers.write().map_err(|_| poisoned())?;

        if customers.values().any(|c| c.email == new.email) {
            return Err(StoreError::Duplicate(format!(
                "email already registered: {}",
                new.email
            )));
        }

        let customer = Customer {
            id: CustomerId::new(EntityId::new()),
            name: new.name,
            email: new.email,
            created_at: Utc::now(),
        };
        customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    fn find_by_id(&self, customer_id: CustomerId) -> Result<Option<Customer>, StoreError> {
        let customers = self.customers.read().map_err(|_| poisoned())?;
        Ok(customers.get(&customer_id).cloned())
    }
}

/// In-memory product store with optimistic stock writes.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProductStore for InMemoryProductStore {
    fn create(&self, new: NewProduct) -> Result<Product, StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;

        if products.values().any(|p| p.name == new.name) {
            return Err(StoreError::Duplicate(format!(
                "product name already in use: {}",
                new.name
            )));
        }

        let product = Product {
            id: ProductId::new(EntityId::new()),
            name: new.name,
            unit_price: new.unit_price,
            quantity: new.quantity,
            version: 1,
            created_at: Utc::now(),
        };
        products.insert(product.id, product.clone());
        Ok(product)
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(products.values().find(|p| p.name == name).cloned())
    }

    fn find_by_ids(&self, product_ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(product_ids
            .iter()
            .filter_map(|id| products.get(id).cloned())
            .collect())
    }

    fn update_quantities(&self, updates: Vec<StockUpdate>) -> Result<Vec<Product>, StoreError> {
        if updates.is_empty() {
            return Ok(vec![]);
        }

        let mut products = self.products.write().map_err(|_| poisoned())?;

        // Validate the whole batch against current state before mutating
        // anything (all-or-nothing).
        let mut seen = HashSet::with_capacity(updates.len());
        for (idx, update) in updates.iter().enumerate() {
            if !seen.insert(update.product_id) {
                return Err(StoreError::InvalidUpdate(format!(
                    "batch contains duplicate product_id (index {idx})"
                )));
            }

            let Some(current) = products.get(&update.product_id) else {
                return Err(StoreError::MissingRecord(format!(
                    "product {}",
                    update.product_id
                )));
            };

            if !update.expected.matches(current.version) {
                return Err(StoreError::Conflict(format!(
                    "product {}: expected {:?}, found {}",
                    update.product_id, update.expected, current.version
                )));
            }
        }

        // Apply and bump versions.
        let mut committed = Vec::with_capacity(updates.len());
        for update in updates {
            let Some(current) = products.get_mut(&update.product_id) else {
                // Every target was validated above.
                return Err(StoreError::MissingRecord(format!(
                    "product {}",
                    update.product_id
                )));
            };
            current.quantity = update.new_quantity;
            current.version += 1;
            committed.push(current.clone());
        }

        Ok(committed)
    }
}

/// In-memory order store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderStore for InMemoryOrderStore {
    fn create(&self, new: NewOrder) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().map_err(|_| poisoned())?;

        let order = Order {
            id: OrderId::new(EntityId::new()),
            customer_id: new.customer_id,
            lines: new.lines,
            created_at: Utc::now(),
        };
        orders.insert(order.id, order.clone());
        Ok(order)
    }

    fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, StoreError> {
        let orders = self.orders.read().map_err(|_| poisoned())?;
        Ok(orders.get(&order_id).cloned())
    }
}
