//! In-memory order store.
//!
//! Orders live in a map guarded by a single read-write lock together with the
//! id counter, so id assignment and insertion happen as one step. Nothing
//! survives a restart.

use crate::{OrderStoreInterface, StorageError, StorageFactory, StorageRegistry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use order_types::{ImplementationRegistry, Order, OrderStatus};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Mutable state of the store. Always accessed under the lock.
struct Inner {
	/// Id handed to the next created order. Never decremented.
	next_id: u64,
	/// Orders keyed by id; iteration order equals creation order.
	orders: BTreeMap<u64, Order>,
}

/// In-memory order store implementation.
pub struct MemoryOrderStore {
	inner: RwLock<Inner>,
	clock: Clock,
}

impl MemoryOrderStore {
	/// Creates an empty store stamping orders with the system clock.
	pub fn new() -> Self {
		Self::with_clock(Utc::now)
	}

	/// Creates an empty store that reads timestamps from `clock`.
	pub fn with_clock(clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
		Self {
			inner: RwLock::new(Inner {
				next_id: 1,
				orders: BTreeMap::new(),
			}),
			clock: Box::new(clock),
		}
	}

	/// Collects matching orders sorted by `created_at` descending.
	///
	/// Orders are visited newest id first and the sort is stable, so equal
	/// timestamps keep the newest id in front and the output is deterministic.
	/// Ties deliberately do not keep insertion order: when the clock cannot
	/// tell two creations apart, the later one is still listed first.
	async fn sorted_orders(&self, filter: impl Fn(&Order) -> bool) -> Vec<Order> {
		let inner = self.inner.read().await;
		let mut orders: Vec<Order> = inner
			.orders
			.values()
			.rev()
			.filter(|order| filter(order))
			.cloned()
			.collect();
		orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		orders
	}
}

impl Default for MemoryOrderStore {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl OrderStoreInterface for MemoryOrderStore {
	async fn create_order(&self, item: String) -> Order {
		let mut inner = self.inner.write().await;
		let id = inner.next_id;
		inner.next_id += 1;

		let order = Order::new(id, item, (self.clock)());
		inner.orders.insert(id, order.clone());
		order
	}

	async fn update_order_status(&self, id: u64, status: OrderStatus) -> Option<Order> {
		let mut inner = self.inner.write().await;
		let order = inner.orders.get_mut(&id)?;
		order.set_status(status, (self.clock)());
		Some(order.clone())
	}

	async fn get_order_by_id(&self, id: u64) -> Option<Order> {
		let inner = self.inner.read().await;
		inner.orders.get(&id).cloned()
	}

	async fn get_active_orders(&self) -> Vec<Order> {
		self.sorted_orders(|order| order.status.is_active()).await
	}

	async fn get_all_orders(&self) -> Vec<Order> {
		self.sorted_orders(|_| true).await
	}

	async fn len(&self) -> usize {
		self.inner.read().await.orders.len()
	}
}

/// Registry entry for the memory backend.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl StorageRegistry for Registry {}

/// Factory function to create a memory storage backend from configuration.
///
/// Configuration parameters:
/// - None required for memory storage
pub fn create_storage(
	config: &toml::Value,
) -> Result<Box<dyn OrderStoreInterface>, StorageError> {
	if !config.is_table() {
		return Err(StorageError::Configuration(
			"memory storage configuration must be a table".into(),
		));
	}
	Ok(Box::new(MemoryOrderStore::new()))
}
