//! Server-side components of the potato service.
//!
//! - [`catalog`] - the record collection requests are answered from.
//! - [`config`] - CLI and environment configuration.
//! - [`gateway`] - HTTP/JSON gateway proxying to the gRPC service.
//! - [`service`] - gRPC service implementation.
//! - [`telemetry`] - logging, tracing and metrics setup.

pub mod catalog;
pub mod config;
pub mod gateway;
pub mod service;
pub mod telemetry;
