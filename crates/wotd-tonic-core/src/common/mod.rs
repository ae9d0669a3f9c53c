//! Types shared by the server, its stores and its clients.
//!
//! - [`error`] - Service and store error types.
//! - [`store`] - The read and write capabilities a word store exposes.
//! - [`types`] - The word record and its protobuf conversions.

pub mod error;
pub mod store;
pub mod types;

pub use error::*;
pub use store::*;
pub use types::*;
