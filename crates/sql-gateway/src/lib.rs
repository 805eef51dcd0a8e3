//! SQL gateway for a single client-queried table
//!
//! This crate admits client-supplied SQL through a fixed prefix denylist and
//! executes admitted statements against a PostgreSQL pool, serializing any
//! returned rows to JSON. Structured inserts bypass raw SQL entirely and go
//! through a parameter-bound statement scoped to the configured table.

pub mod admission;
mod executor;
mod gateway;

pub use admission::{admit_payload, admit_statement, SqlCommand, DENIED_PREFIXES};
pub use executor::QueryExecutor;
pub use gateway::{GatewayConfig, TableGateway};
