//! API types for the order management HTTP API.
//!
//! This module defines the request and response bodies for the v1 and v2
//! order endpoints, the pagination envelope and the structured error type
//! that maps failures onto HTTP status codes.

use axum::http::StatusCode;
use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::OrderStatus;

/// Request body for creating an order (v1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
	/// What is being ordered. Must be a non-empty string.
	pub item: String,
}

/// Request body for creating an order (v2).
///
/// `quantity` is accepted for forward compatibility but not stored. Any JSON
/// value is accepted for it; only non-negative integers are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderV2Request {
	/// What is being ordered. Must be a non-empty string.
	pub item: String,
	/// Requested quantity, currently ignored.
	#[serde(default, deserialize_with = "lenient_quantity")]
	pub quantity: Option<u32>,
}

fn lenient_quantity<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Quantity {
		Count(u32),
		Other(IgnoredAny),
	}

	Ok(match Quantity::deserialize(deserializer)? {
		Quantity::Count(count) => Some(count),
		Quantity::Other(_) => None,
	})
}

/// Request body for changing an order's status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
	/// The new status.
	pub status: OrderStatus,
}

/// Raw pagination query parameters.
///
/// Kept as text so malformed values can fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaginationQuery {
	pub page: Option<String>,
	pub limit: Option<String>,
}

/// Pagination metadata returned next to a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
	/// Normalized page number that was served (1-based).
	pub current_page: u64,
	/// Normalized page size that was applied.
	pub items_per_page: u64,
	/// Length of the full sequence before slicing.
	pub total_items: u64,
	/// `ceil(total_items / items_per_page)`; zero when there are no items.
	pub total_pages: u64,
}

/// A page of results with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
	/// Items on this page.
	pub data: Vec<T>,
	/// Describes where this page sits in the full sequence.
	pub pagination: PaginationMeta,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
	pub status: String,
}

impl HealthResponse {
	pub fn healthy() -> Self {
		Self {
			status: "healthy".to_string(),
		}
	}
}

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Always `"error"`.
	pub status: String,
	/// Human-readable description
	pub message: String,
	/// Suggested retry delay in seconds
	#[serde(rename = "retryAfter", skip_serializing_if = "Option::is_none")]
	pub retry_after: Option<u64>,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum APIError {
	/// Caller input violates a precondition (400)
	BadRequest { message: String },
	/// Referenced resource does not exist (404)
	NotFound { message: String },
	/// Client exceeded its request budget (429)
	TooManyRequests {
		message: String,
		retry_after: Option<u64>,
	},
	/// Internal server error (500)
	InternalServerError { message: String },
}

impl APIError {
	pub fn bad_request(message: impl Into<String>) -> Self {
		APIError::BadRequest {
			message: message.into(),
		}
	}

	pub fn not_found(message: impl Into<String>) -> Self {
		APIError::NotFound {
			message: message.into(),
		}
	}

	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> StatusCode {
		match self {
			APIError::BadRequest { .. } => StatusCode::BAD_REQUEST,
			APIError::NotFound { .. } => StatusCode::NOT_FOUND,
			APIError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
			APIError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn message(&self) -> &str {
		match self {
			APIError::BadRequest { message }
			| APIError::NotFound { message }
			| APIError::TooManyRequests { message, .. }
			| APIError::InternalServerError { message } => message,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		let retry_after = match self {
			APIError::TooManyRequests { retry_after, .. } => *retry_after,
			_ => None,
		};
		ErrorResponse {
			status: "error".to_string(),
			message: self.message().to_string(),
			retry_after,
		}
	}
}

impl fmt::Display for APIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			APIError::BadRequest { message } => write!(f, "Bad Request: {}", message),
			APIError::NotFound { message } => write!(f, "Not Found: {}", message),
			APIError::TooManyRequests { message, .. } => {
				write!(f, "Too Many Requests: {}", message)
			},
			APIError::InternalServerError { message } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for APIError {}

impl axum::response::IntoResponse for APIError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::header, http::HeaderValue, response::Json};

		let status = self.status_code();
		let error_response = self.to_error_response();
		let mut response = (status, Json(error_response)).into_response();

		if let APIError::TooManyRequests {
			retry_after: Some(secs),
			..
		} = self
		{
			if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
				response.headers_mut().insert(header::RETRY_AFTER, value);
			}
		}

		response
	}
}
