//! Storage boundary for the records the order workflow touches.
//!
//! This module defines infrastructure-facing abstractions for customers,
//! products, and orders without making any storage assumptions.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::{InMemoryCustomerStore, InMemoryOrderStore, InMemoryProductStore};
pub use r#trait::{CustomerStore, OrderStore, ProductStore, StoreError};
