//! Storage module for the order management service.
//!
//! This module provides the abstraction over the order store: the sole
//! authority for order identity, creation, status updates and retrieval
//! ordering. Backends are selected by name from configuration; the only
//! shipped backend keeps everything in memory.

use async_trait::async_trait;
use order_types::{ImplementationRegistry, Order, OrderStatus};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur while constructing a storage backend.
///
/// Order operations themselves do not fail: a lookup miss is reported as
/// `None`, not as an error.
#[derive(Debug, Error)]
pub enum StorageError {
	/// The configured backend name has no registered implementation.
	#[error("Unknown storage implementation: {0}")]
	UnknownImplementation(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface every order store must provide.
///
/// Implementations must make `create_order` and `update_order_status` appear
/// atomic to concurrent callers: no two creations may observe the same id and
/// no reader may observe a partially written order.
#[async_trait]
pub trait OrderStoreInterface: Send + Sync {
	/// Creates a new order with the next sequential id and `Received` status.
	///
	/// The item is trusted; callers validate it before invoking the store.
	async fn create_order(&self, item: String) -> Order;

	/// Overwrites the status of an order and refreshes its `updated_at`.
	///
	/// Returns `None` if no order has the given id.
	async fn update_order_status(&self, id: u64, status: OrderStatus) -> Option<Order>;

	/// Looks up a single order.
	async fn get_order_by_id(&self, id: u64) -> Option<Order>;

	/// Returns every non-completed order, most recently created first.
	async fn get_active_orders(&self) -> Vec<Order>;

	/// Returns every order regardless of status, most recently created first.
	async fn get_all_orders(&self) -> Vec<Order>;

	/// Number of orders currently held.
	async fn len(&self) -> usize;

	/// Whether the store holds no orders.
	async fn is_empty(&self) -> bool {
		self.len().await == 0
	}
}

/// Type alias for storage factory functions.
///
/// This is the function signature that all storage implementations must provide
/// to create instances of their storage interface.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn OrderStoreInterface>, StorageError>;

/// Registry for storage implementations.
///
/// Ties the base `ImplementationRegistry` to the storage factory type.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for all available storage implementations.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::memory;

	vec![(memory::Registry::NAME, memory::Registry::factory())]
}

/// Builds the storage backend registered under `name`.
pub fn create_storage(
	name: &str,
	config: &toml::Value,
) -> Result<Box<dyn OrderStoreInterface>, StorageError> {
	let factory = get_all_implementations()
		.into_iter()
		.find(|(registered, _)| *registered == name)
		.map(|(_, factory)| factory)
		.ok_or_else(|| StorageError::UnknownImplementation(name.to_string()))?;

	tracing::debug!("Creating '{}' order storage", name);
	factory(config)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_registry_lists_memory() {
		let names: Vec<_> = get_all_implementations()
			.into_iter()
			.map(|(name, _)| name)
			.collect();
		assert_eq!(names, vec!["memory"]);
	}

	#[tokio::test]
	async fn test_create_storage_by_name() {
		let config = toml::Value::Table(toml::map::Map::new());
		let store = create_storage("memory", &config).unwrap();
		assert!(store.is_empty().await);
	}

	#[test]
	fn test_create_storage_unknown_name() {
		let config = toml::Value::Table(toml::map::Map::new());
		let result = create_storage("redis", &config);
		assert!(matches!(
			result,
			Err(StorageError::UnknownImplementation(ref name)) if name == "redis"
		));
	}
}
