//! Server-side components of the My Word Of The Day service.
//!
//! ## Submodules
//!
//! - [`config`] - CLI/environment configuration and validation.
//! - [`store`] - Postgres word store (and an in-memory one for tests).
//! - [`service`] - gRPC service implementation and random word selection.
//! - [`gateway`] - JSON/REST adapter over the same service, served under
//!   `/api`.
//! - [`notify`] - HTML template rendering and SMTP delivery.
//! - [`schedule`] - Cron expressions and the scheduled mail loop.
//! - [`health`] - Database-driven `grpc.health.v1` status.
//! - [`telemetry`] - Logging initialization and optional metrics.
//!
//! These components are wired together in the server's `main.rs`.

pub mod config;
pub mod gateway;
pub mod health;
pub mod notify;
pub mod schedule;
pub mod service;
pub mod store;
pub mod telemetry;
