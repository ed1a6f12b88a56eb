//! Infrastructure layer: storage boundaries and the order placement pipeline.

pub mod order_placement;
pub mod store;
