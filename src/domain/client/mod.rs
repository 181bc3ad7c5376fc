//! Client domain module.

mod aggregate;

pub use aggregate::{Client, ClientStatus};
