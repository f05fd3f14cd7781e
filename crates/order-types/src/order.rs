//! Order entity and lifecycle status.
//!
//! An order is a single purchase record identified by a store-assigned integer.
//! Its status moves freely among three values; there is no guarded transition
//! table, so `Completed -> Received` is as legal as any other change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an order.
///
/// Serialized in lowercase (`"received"`, `"preparing"`, `"completed"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
	/// Initial status assigned on creation.
	Received,
	/// Order is being worked on.
	Preparing,
	/// Order is done and no longer counts as active.
	Completed,
}

impl OrderStatus {
	/// All status values, in lifecycle order.
	pub const ALL: [OrderStatus; 3] = [
		OrderStatus::Received,
		OrderStatus::Preparing,
		OrderStatus::Completed,
	];

	/// Returns the wire representation of the status.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Received => "received",
			OrderStatus::Preparing => "preparing",
			OrderStatus::Completed => "completed",
		}
	}

	/// Whether an order in this status is still active.
	pub fn is_active(&self) -> bool {
		!matches!(self, OrderStatus::Completed)
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A single order tracked by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	/// Store-assigned identifier, starting at 1.
	pub id: u64,
	/// Free-text label of what was ordered.
	pub item: String,
	/// Current status of the order.
	pub status: OrderStatus,
	/// Timestamp when this order was created.
	pub created_at: DateTime<Utc>,
	/// Timestamp of the last status change (creation time if never changed).
	pub updated_at: DateTime<Utc>,
}

impl Order {
	/// Creates a freshly received order stamped with `now`.
	pub fn new(id: u64, item: impl Into<String>, now: DateTime<Utc>) -> Self {
		Self {
			id,
			item: item.into(),
			status: OrderStatus::Received,
			created_at: now,
			updated_at: now,
		}
	}

	/// Sets a new status and bumps `updated_at`.
	///
	/// `updated_at` never moves before `created_at`, even if the wall clock
	/// went backwards since creation.
	pub fn set_status(&mut self, status: OrderStatus, now: DateTime<Utc>) {
		self.status = status;
		self.updated_at = now.max(self.created_at);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Duration;

	#[test]
	fn test_status_wire_format() {
		assert_eq!(
			serde_json::to_string(&OrderStatus::Preparing).unwrap(),
			"\"preparing\""
		);
		let status: OrderStatus = serde_json::from_str("\"completed\"").unwrap();
		assert_eq!(status, OrderStatus::Completed);
		assert!(serde_json::from_str::<OrderStatus>("\"Completed\"").is_err());
		assert!(serde_json::from_str::<OrderStatus>("\"shipped\"").is_err());
	}

	#[test]
	fn test_is_active() {
		assert!(OrderStatus::Received.is_active());
		assert!(OrderStatus::Preparing.is_active());
		assert!(!OrderStatus::Completed.is_active());
	}

	#[test]
	fn test_order_json_shape() {
		let now = Utc::now();
		let order = Order::new(7, "Widget", now);
		let value = serde_json::to_value(&order).unwrap();

		assert_eq!(value["id"], 7);
		assert_eq!(value["item"], "Widget");
		assert_eq!(value["status"], "received");
		assert!(value["createdAt"].is_string());
		assert!(value["updatedAt"].is_string());
	}

	#[test]
	fn test_set_status_never_precedes_creation() {
		let now = Utc::now();
		let mut order = Order::new(1, "Widget", now);

		order.set_status(OrderStatus::Completed, now - Duration::seconds(30));
		assert_eq!(order.status, OrderStatus::Completed);
		assert_eq!(order.updated_at, order.created_at);

		let later = now + Duration::seconds(5);
		order.set_status(OrderStatus::Received, later);
		assert_eq!(order.status, OrderStatus::Received);
		assert_eq!(order.updated_at, later);
	}
}
