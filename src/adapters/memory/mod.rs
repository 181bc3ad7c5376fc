//! In-memory storage adapters.

mod billing_store;

pub use billing_store::InMemoryBillingStore;
