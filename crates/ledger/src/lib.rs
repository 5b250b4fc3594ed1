//! Ledger store for durable fulfillment facts.
//!
//! A ledger is a set of named collections holding one flat string record
//! per key. The fulfillment saga writes billing and shipment history keyed
//! by order ID; the same store backs the read-only inventory lookups.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::OrderId;
pub use error::{LedgerError, Result};
pub use memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;
pub use store::{LedgerFields, LedgerStore, fields};
