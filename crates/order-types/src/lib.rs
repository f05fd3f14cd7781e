//! Common types module for the order management service.
//!
//! This module defines the order entity and the request/response structures
//! shared by the store, the service layer and the HTTP API.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Order entity and lifecycle status.
pub mod order;
/// Registry trait for configurable implementations.
pub mod registry;

// Re-export all types for convenient access
pub use api::*;
pub use order::*;
pub use registry::*;
