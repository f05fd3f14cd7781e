//! Order service for the order management system.
//!
//! `OrderService` is the handle the HTTP layer holds. It owns a reference to
//! the configured order store, logs each operation and layers pagination on
//! top of the active-order listing.

pub mod pagination;

use order_storage::OrderStoreInterface;
use order_types::{Order, OrderStatus, PaginatedResponse};
use std::sync::Arc;
use tracing::{debug, info};

pub use pagination::{paginate, PageRequest};

/// Entry point for every order operation.
///
/// Cloning is cheap and every clone shares the same store.
#[derive(Clone)]
pub struct OrderService {
	store: Arc<dyn OrderStoreInterface>,
}

impl OrderService {
	pub fn new(store: Arc<dyn OrderStoreInterface>) -> Self {
		Self { store }
	}

	/// Creates a new order. `item` must already be validated as non-empty.
	pub async fn create_order(&self, item: String) -> Order {
		info!("Creating new order for item: {}", item);
		let order = self.store.create_order(item).await;
		debug!(order_id = order.id, "Order created");
		order
	}

	/// Changes an order's status, or returns `None` if the id is unknown.
	pub async fn update_order_status(&self, id: u64, status: OrderStatus) -> Option<Order> {
		info!("Updating order {} status to: {}", id, status);
		self.store.update_order_status(id, status).await
	}

	pub async fn get_order_by_id(&self, id: u64) -> Option<Order> {
		self.store.get_order_by_id(id).await
	}

	/// Non-completed orders, most recently created first.
	pub async fn get_active_orders(&self) -> Vec<Order> {
		info!("Fetching active orders");
		self.store.get_active_orders().await
	}

	/// One page of the active-order listing.
	pub async fn get_active_orders_page(&self, request: PageRequest) -> PaginatedResponse<Order> {
		info!(
			page = request.page(),
			limit = request.limit(),
			"Fetching paginated active orders"
		);
		let orders = self.store.get_active_orders().await;
		paginate(orders, request)
	}

	/// All orders, most recently created first.
	pub async fn get_all_orders(&self) -> Vec<Order> {
		info!("Fetching all orders");
		self.store.get_all_orders().await
	}
}
