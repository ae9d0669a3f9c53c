//! Word store implementations.
//!
//! - [`postgres`] - The production store, backed by a `sqlx` Postgres pool.
//! - `memory` - An in-process store used by the test suite.

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[cfg(test)]
pub use memory::MemoryWordStore;
pub use postgres::PgWordStore;
