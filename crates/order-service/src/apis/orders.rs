//! Order endpoints for the v1 and v2 APIs.
//!
//! Request bodies arrive as axum extraction results so that malformed JSON,
//! missing fields and wrong types all surface as the same validation message
//! a caller would get for an empty item or an unknown status.

use axum::extract::{rejection::JsonRejection, Json, Query};
use order_core::{OrderService, PageRequest};
use order_types::{
	APIError, CreateOrderRequest, CreateOrderV2Request, Order, PaginatedResponse,
	PaginationQuery, UpdateOrderStatusRequest,
};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while handling an order request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderRequestError {
	#[error("Invalid request: item must be a non-empty string")]
	InvalidItem,
	#[error("Invalid order ID")]
	InvalidId,
	#[error("Invalid status")]
	InvalidStatus,
	#[error("Order not found")]
	NotFound,
}

impl From<OrderRequestError> for APIError {
	fn from(err: OrderRequestError) -> Self {
		match err {
			OrderRequestError::NotFound => APIError::not_found(err.to_string()),
			_ => APIError::bad_request(err.to_string()),
		}
	}
}

/// Handles order creation for the v1 API.
pub async fn create_order(
	payload: Result<Json<CreateOrderRequest>, JsonRejection>,
	orders: &OrderService,
) -> Result<Order, OrderRequestError> {
	let Json(request) = payload.map_err(|rejection| {
		warn!("Rejected order body: {}", rejection.body_text());
		OrderRequestError::InvalidItem
	})?;

	let item = validate_item(request.item)?;
	Ok(orders.create_order(item).await)
}

/// Handles order creation for the v2 API. The quantity is accepted but not
/// stored.
pub async fn create_order_v2(
	payload: Result<Json<CreateOrderV2Request>, JsonRejection>,
	orders: &OrderService,
) -> Result<Order, OrderRequestError> {
	let Json(request) = payload.map_err(|rejection| {
		warn!("Rejected v2 order body: {}", rejection.body_text());
		OrderRequestError::InvalidItem
	})?;

	if let Some(quantity) = request.quantity {
		debug!(quantity, "Ignoring quantity on v2 order");
	}

	let item = validate_item(request.item)?;
	Ok(orders.create_order(item).await)
}

/// Handles a status change. The id is checked before the body.
///
/// An id that is a well-formed integer but cannot name an order (negative or
/// past `u64::MAX`) passes validation and ends as not found.
pub async fn update_order_status(
	id: &str,
	payload: Result<Json<UpdateOrderStatusRequest>, JsonRejection>,
	orders: &OrderService,
) -> Result<Order, OrderRequestError> {
	let order_id = parse_order_id(id)?;

	let Json(request) = payload.map_err(|rejection| {
		warn!("Rejected status update for order {}: {}", id, rejection.body_text());
		OrderRequestError::InvalidStatus
	})?;

	let Some(order_id) = order_id else {
		return Err(OrderRequestError::NotFound);
	};

	orders
		.update_order_status(order_id, request.status)
		.await
		.ok_or(OrderRequestError::NotFound)
}

/// Handles the paginated active-order listing. Unreadable query strings are
/// served with the default page.
pub async fn get_active_orders_page(
	query: Result<Query<PaginationQuery>, impl std::fmt::Display>,
	orders: &OrderService,
) -> PaginatedResponse<Order> {
	let query = match query {
		Ok(Query(query)) => query,
		Err(rejection) => {
			debug!("Falling back to default pagination: {}", rejection);
			PaginationQuery::default()
		},
	};

	let request = PageRequest::from_raw(query.page.as_deref(), query.limit.as_deref());
	orders.get_active_orders_page(request).await
}

fn validate_item(item: String) -> Result<String, OrderRequestError> {
	if item.is_empty() {
		return Err(OrderRequestError::InvalidItem);
	}
	Ok(item)
}

/// Returns `Ok(None)` for integers outside the id range.
fn parse_order_id(id: &str) -> Result<Option<u64>, OrderRequestError> {
	if let Ok(order_id) = id.parse::<u64>() {
		return Ok(Some(order_id));
	}

	let digits = id.strip_prefix(['-', '+']).unwrap_or(id);
	if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
		return Ok(None);
	}

	warn!("Invalid order ID: {}", id);
	Err(OrderRequestError::InvalidId)
}
