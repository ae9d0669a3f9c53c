//! Word orchestration layer.
//!
//! ## Structure
//!
//! - [`handler`] - [`WordService`], the gRPC entry point and the logic shared
//!   with the REST gateway.
//! - [`random`] - Uniform random selection over the stored words.

pub mod handler;
pub mod random;

pub use handler::WordService;
