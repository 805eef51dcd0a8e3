//! Statement execution against the pool

mod execute;
mod rows;
mod types;

pub use types::QueryExecutor;
