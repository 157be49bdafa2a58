//! Storage layer: store handle, schema contract, migrations

pub mod migrate;
pub mod schema;
mod store;

pub use store::{Store, StoreStats};
