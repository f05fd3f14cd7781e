//! HTTP server for the order management API.
//!
//! Routes the v1 and v2 order endpoints, the health check and the API
//! documentation, and wraps them in the transport middleware: tracing,
//! security headers, CORS, rate limiting, request timeout and body limit.

use axum::{
	extract::{
		rejection::{JsonRejection, PathRejection, QueryRejection},
		DefaultBodyLimit, Path, Query, State,
	},
	http::{header, HeaderName, HeaderValue, Method, StatusCode},
	response::{Html, Json},
	routing::{get, post, put},
	Router,
};
use order_config::{ApiConfig, CorsConfig};
use order_core::OrderService;
use order_types::{
	APIError, CreateOrderRequest, CreateOrderV2Request, HealthResponse, Order, PaginatedResponse,
	PaginationQuery, UpdateOrderStatusRequest,
};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
	cors::{Any, CorsLayer},
	limit::RequestBodyLimitLayer,
	set_header::SetResponseHeaderLayer,
	timeout::TimeoutLayer,
	trace::TraceLayer,
};

use crate::apis::{docs, orders};
use crate::rate_limit::{self, RateLimiter};

/// Errors raised while assembling the router from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
	#[error("Invalid CORS origin: {0}")]
	InvalidCorsOrigin(String),
	#[error("Invalid CORS method: {0}")]
	InvalidCorsMethod(String),
	#[error("Invalid CORS header: {0}")]
	InvalidCorsHeader(String),
}

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Handle to the order store.
	pub orders: OrderService,
}

/// Starts the HTTP server for the API and serves until Ctrl-C.
pub async fn start_server(
	api_config: ApiConfig,
	orders: OrderService,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = build_router(AppState { orders }, &api_config)?;

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Order API server starting on {}", bind_address);

	axum::serve(
		listener,
		app.into_make_service_with_connect_info::<SocketAddr>(),
	)
	.with_graceful_shutdown(shutdown_signal())
	.await?;

	tracing::info!("Order API server stopped");
	Ok(())
}

/// Builds the full application router, middleware included.
pub fn build_router(state: AppState, api_config: &ApiConfig) -> Result<Router, ServerError> {
	let mut app = Router::new()
		.route("/health", get(handle_health))
		.route("/api-docs", get(handle_swagger_ui))
		.route(docs::OPENAPI_PATH, get(handle_openapi))
		.nest("/api/v1", v1_routes())
		.nest("/api/v2", v2_routes())
		.fallback(handle_not_found)
		.with_state(state)
		.layer(DefaultBodyLimit::disable())
		.layer(RequestBodyLimitLayer::new(api_config.max_request_size))
		.layer(request_timeout(Duration::from_secs(
			api_config.timeout_seconds,
		)));

	let rate_limiting = &api_config.rate_limiting;
	if rate_limiting.enabled {
		tracing::info!(
			max_requests = rate_limiting.max_requests,
			window_seconds = rate_limiting.window_seconds,
			"Rate limiting enabled"
		);
		let limiter = Arc::new(RateLimiter::from_config(rate_limiting));
		app = app.layer(axum::middleware::from_fn_with_state(
			limiter,
			rate_limit::limit_requests,
		));
	}

	let cors = build_cors(api_config.cors.as_ref())?;
	let [nosniff, frame_options, referrer, dns_prefetch, opener_policy] = security_headers();

	Ok(app.layer(
		ServiceBuilder::new()
			.layer(TraceLayer::new_for_http())
			.layer(nosniff)
			.layer(frame_options)
			.layer(referrer)
			.layer(dns_prefetch)
			.layer(opener_policy)
			.layer(cors),
	))
}

fn v1_routes() -> Router<AppState> {
	Router::new()
		.route(
			"/orders",
			post(handle_create_order).get(handle_get_active_orders),
		)
		.route("/orders/all", get(handle_get_all_orders))
		.route("/orders/{id}", put(handle_update_order_status))
}

/// Same as v1 except that creation accepts a quantity and the active listing
/// is paginated.
fn v2_routes() -> Router<AppState> {
	Router::new()
		.route(
			"/orders",
			post(handle_create_order_v2).get(handle_get_active_orders_page),
		)
		.route("/orders/all", get(handle_get_all_orders))
		.route("/orders/{id}", put(handle_update_order_status))
}

/// Answers 408 when a request is not served within `timeout`.
fn request_timeout(timeout: Duration) -> TimeoutLayer {
	TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

fn security_headers() -> [SetResponseHeaderLayer<HeaderValue>; 5] {
	[
		(header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
		(header::X_FRAME_OPTIONS, "SAMEORIGIN"),
		(header::REFERRER_POLICY, "no-referrer"),
		(header::X_DNS_PREFETCH_CONTROL, "off"),
		(
			HeaderName::from_static("cross-origin-opener-policy"),
			"same-origin",
		),
	]
	.map(|(name, value)| {
		SetResponseHeaderLayer::if_not_present(name, HeaderValue::from_static(value))
	})
}

/// Permissive CORS unless explicit origins are configured.
fn build_cors(cors: Option<&CorsConfig>) -> Result<CorsLayer, ServerError> {
	let Some(cors) = cors else {
		return Ok(CorsLayer::permissive());
	};

	let mut layer = CorsLayer::new();

	if cors.allowed_origins.iter().any(|origin| origin == "*") {
		layer = layer.allow_origin(Any);
	} else {
		let origins = cors
			.allowed_origins
			.iter()
			.map(|origin| {
				HeaderValue::from_str(origin)
					.map_err(|_| ServerError::InvalidCorsOrigin(origin.clone()))
			})
			.collect::<Result<Vec<_>, _>>()?;
		layer = layer.allow_origin(origins);
	}

	if cors.allowed_methods.is_empty() {
		layer = layer.allow_methods(Any);
	} else {
		let methods = cors
			.allowed_methods
			.iter()
			.map(|method| {
				Method::from_bytes(method.to_uppercase().as_bytes())
					.map_err(|_| ServerError::InvalidCorsMethod(method.clone()))
			})
			.collect::<Result<Vec<_>, _>>()?;
		layer = layer.allow_methods(methods);
	}

	if cors.allowed_headers.is_empty() {
		layer = layer.allow_headers(Any);
	} else {
		let headers = cors
			.allowed_headers
			.iter()
			.map(|name| {
				HeaderName::from_bytes(name.as_bytes())
					.map_err(|_| ServerError::InvalidCorsHeader(name.clone()))
			})
			.collect::<Result<Vec<_>, _>>()?;
		layer = layer.allow_headers(headers);
	}

	Ok(layer)
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!("Failed to listen for shutdown signal: {}", e);
		return;
	}
	tracing::info!("Shutdown signal received");
}

/// Handles POST /api/v1/orders requests.
async fn handle_create_order(
	State(state): State<AppState>,
	payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), APIError> {
	let order = orders::create_order(payload, &state.orders).await?;
	Ok((StatusCode::CREATED, Json(order)))
}

/// Handles POST /api/v2/orders requests.
async fn handle_create_order_v2(
	State(state): State<AppState>,
	payload: Result<Json<CreateOrderV2Request>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), APIError> {
	let order = orders::create_order_v2(payload, &state.orders).await?;
	Ok((StatusCode::CREATED, Json(order)))
}

/// Handles PUT /api/{version}/orders/{id} requests.
async fn handle_update_order_status(
	State(state): State<AppState>,
	id: Result<Path<String>, PathRejection>,
	payload: Result<Json<UpdateOrderStatusRequest>, JsonRejection>,
) -> Result<Json<Order>, APIError> {
	let Path(id) = id.map_err(|rejection| {
		tracing::warn!("Rejected order path: {}", rejection.body_text());
		APIError::from(orders::OrderRequestError::InvalidId)
	})?;

	let order = orders::update_order_status(&id, payload, &state.orders).await?;
	Ok(Json(order))
}

/// Handles GET /api/v1/orders requests.
async fn handle_get_active_orders(State(state): State<AppState>) -> Json<Vec<Order>> {
	Json(state.orders.get_active_orders().await)
}

/// Handles GET /api/v2/orders requests.
async fn handle_get_active_orders_page(
	State(state): State<AppState>,
	query: Result<Query<PaginationQuery>, QueryRejection>,
) -> Json<PaginatedResponse<Order>> {
	Json(orders::get_active_orders_page(query, &state.orders).await)
}

/// Handles GET /api/{version}/orders/all requests.
async fn handle_get_all_orders(State(state): State<AppState>) -> Json<Vec<Order>> {
	Json(state.orders.get_all_orders().await)
}

async fn handle_health() -> Json<HealthResponse> {
	Json(HealthResponse::healthy())
}

async fn handle_openapi() -> Json<Value> {
	Json(docs::openapi_document())
}

async fn handle_swagger_ui() -> Html<&'static str> {
	Html(docs::swagger_ui_page())
}

async fn handle_not_found() -> APIError {
	APIError::not_found("Not found")
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::body::{to_bytes, Body};
	use axum::http::{HeaderMap, Request};
	use order_config::ConfigBuilder;
	use order_storage::implementations::memory::MemoryOrderStore;
	use serde_json::json;
	use tower::ServiceExt;

	fn app_with(api_config: &ApiConfig) -> Router {
		let state = AppState {
			orders: OrderService::new(Arc::new(MemoryOrderStore::new())),
		};
		build_router(state, api_config).unwrap()
	}

	fn app() -> Router {
		app_with(&ConfigBuilder::new().build().api)
	}

	async fn send(
		app: &Router,
		method: Method,
		uri: &str,
		body: Option<Value>,
	) -> (StatusCode, HeaderMap, Value) {
		let mut builder = Request::builder().method(method).uri(uri);
		let body = match body {
			Some(json) => {
				builder = builder.header(header::CONTENT_TYPE, "application/json");
				Body::from(json.to_string())
			},
			None => Body::empty(),
		};

		let response = app
			.clone()
			.oneshot(builder.body(body).unwrap())
			.await
			.unwrap();
		let status = response.status();
		let headers = response.headers().clone();
		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
		(status, headers, value)
	}

	#[tokio::test]
	async fn test_create_order() {
		let app = app();
		let (status, _, body) = send(
			&app,
			Method::POST,
			"/api/v1/orders",
			Some(json!({ "item": "Widget" })),
		)
		.await;

		assert_eq!(status, StatusCode::CREATED);
		assert_eq!(body["id"], 1);
		assert_eq!(body["item"], "Widget");
		assert_eq!(body["status"], "received");
		assert!(body["createdAt"].is_string());
		assert_eq!(body["createdAt"], body["updatedAt"]);
	}

	#[tokio::test]
	async fn test_create_order_validation() {
		let app = app();
		let expected = json!({
			"status": "error",
			"message": "Invalid request: item must be a non-empty string"
		});

		for payload in [json!({}), json!({ "item": "" }), json!({ "item": 42 })] {
			let (status, _, body) =
				send(&app, Method::POST, "/api/v1/orders", Some(payload)).await;
			assert_eq!(status, StatusCode::BAD_REQUEST);
			assert_eq!(body, expected);
		}

		let (status, _, body) = send(&app, Method::POST, "/api/v2/orders", None).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body, expected);
	}

	#[tokio::test]
	async fn test_update_order_errors() {
		let app = app();
		send(
			&app,
			Method::POST,
			"/api/v1/orders",
			Some(json!({ "item": "Widget" })),
		)
		.await;

		let (status, _, body) = send(
			&app,
			Method::PUT,
			"/api/v1/orders/abc",
			Some(json!({ "status": "preparing" })),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["message"], "Invalid order ID");

		let (status, _, body) = send(
			&app,
			Method::PUT,
			"/api/v1/orders/1",
			Some(json!({ "status": "shipped" })),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["message"], "Invalid status");

		let (status, _, body) = send(
			&app,
			Method::PUT,
			"/api/v2/orders/42",
			Some(json!({ "status": "completed" })),
		)
		.await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(
			body,
			json!({ "status": "error", "message": "Order not found" })
		);
	}

	#[tokio::test]
	async fn test_order_lifecycle() {
		let app = app();
		send(
			&app,
			Method::POST,
			"/api/v1/orders",
			Some(json!({ "item": "Widget" })),
		)
		.await;

		let (status, _, body) = send(
			&app,
			Method::PUT,
			"/api/v1/orders/1",
			Some(json!({ "status": "preparing" })),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["status"], "preparing");

		let (_, _, active) = send(&app, Method::GET, "/api/v1/orders", None).await;
		assert_eq!(active.as_array().unwrap().len(), 1);
		assert_eq!(active[0]["status"], "preparing");

		send(
			&app,
			Method::PUT,
			"/api/v1/orders/1",
			Some(json!({ "status": "completed" })),
		)
		.await;

		let (_, _, active) = send(&app, Method::GET, "/api/v1/orders", None).await;
		assert_eq!(active, json!([]));

		let (status, _, all) = send(&app, Method::GET, "/api/v1/orders/all", None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(all.as_array().unwrap().len(), 1);
		assert_eq!(all[0]["status"], "completed");
	}

	#[tokio::test]
	async fn test_v2_quantity_is_never_rejected() {
		let app = app();
		for quantity in [json!(-1), json!("2"), json!(2.5), Value::Null] {
			let (status, _, body) = send(
				&app,
				Method::POST,
				"/api/v2/orders",
				Some(json!({ "item": "Widget", "quantity": quantity })),
			)
			.await;
			assert_eq!(status, StatusCode::CREATED, "quantity {}", quantity);
			assert_eq!(body["item"], "Widget");
			assert!(body.get("quantity").is_none());
		}
	}

	#[tokio::test]
	async fn test_update_impossible_id_is_not_found() {
		let app = app();
		send(
			&app,
			Method::POST,
			"/api/v1/orders",
			Some(json!({ "item": "Widget" })),
		)
		.await;

		for uri in ["/api/v1/orders/-1", "/api/v2/orders/99999999999999999999999"] {
			let (status, _, body) =
				send(&app, Method::PUT, uri, Some(json!({ "status": "completed" }))).await;
			assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
			assert_eq!(body["message"], "Order not found");
		}

		let (status, _, body) = send(
			&app,
			Method::PUT,
			"/api/v1/orders/-1",
			Some(json!({ "status": "shipped" })),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["message"], "Invalid status");
	}

	#[tokio::test]
	async fn test_slow_request_times_out() {
		let app = Router::new()
			.route(
				"/slow",
				get(|| async {
					tokio::time::sleep(Duration::from_secs(5)).await;
					"done"
				}),
			)
			.layer(request_timeout(Duration::from_millis(50)));

		let (status, _, _) = send(&app, Method::GET, "/slow", None).await;
		assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
	}

	#[tokio::test]
	async fn test_versions_share_store() {
		let app = app();
		let (status, _, _) = send(
			&app,
			Method::POST,
			"/api/v2/orders",
			Some(json!({ "item": "Gadget", "quantity": 4 })),
		)
		.await;
		assert_eq!(status, StatusCode::CREATED);

		let (_, _, all) = send(&app, Method::GET, "/api/v1/orders/all", None).await;
		assert_eq!(all[0]["item"], "Gadget");
		assert!(all[0].get("quantity").is_none());
	}

	#[tokio::test]
	async fn test_v2_pagination() {
		let app = app();
		for item in ["A", "B", "C"] {
			send(
				&app,
				Method::POST,
				"/api/v2/orders",
				Some(json!({ "item": item })),
			)
			.await;
		}

		let (status, _, body) =
			send(&app, Method::GET, "/api/v2/orders?page=1&limit=2", None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["data"].as_array().unwrap().len(), 2);
		assert_eq!(body["data"][0]["id"], 3);
		assert_eq!(
			body["pagination"],
			json!({ "currentPage": 1, "itemsPerPage": 2, "totalItems": 3, "totalPages": 2 })
		);

		let (_, _, body) = send(
			&app,
			Method::GET,
			"/api/v2/orders?page=invalid&limit=invalid",
			None,
		)
		.await;
		assert_eq!(body["pagination"]["currentPage"], 1);
		assert_eq!(body["pagination"]["itemsPerPage"], 10);
		assert_eq!(body["data"].as_array().unwrap().len(), 3);
	}

	#[tokio::test]
	async fn test_v2_pagination_empty() {
		let (_, _, body) = send(&app(), Method::GET, "/api/v2/orders", None).await;
		assert_eq!(
			body,
			json!({
				"data": [],
				"pagination": { "currentPage": 1, "itemsPerPage": 10, "totalItems": 0, "totalPages": 0 }
			})
		);
	}

	#[tokio::test]
	async fn test_unknown_route_and_method() {
		let app = app();
		let (status, _, body) = send(&app, Method::GET, "/api/v3/orders", None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body, json!({ "status": "error", "message": "Not found" }));

		let (status, _, _) = send(
			&app,
			Method::PUT,
			"/api/v1/orders/all",
			Some(json!({ "status": "completed" })),
		)
		.await;
		assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
	}

	#[tokio::test]
	async fn test_health_and_security_headers() {
		let (status, headers, body) = send(&app(), Method::GET, "/health", None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body, json!({ "status": "healthy" }));

		assert_eq!(headers["x-content-type-options"], "nosniff");
		assert_eq!(headers["x-frame-options"], "SAMEORIGIN");
		assert_eq!(headers["referrer-policy"], "no-referrer");
		assert_eq!(headers["x-dns-prefetch-control"], "off");
		assert_eq!(headers["cross-origin-opener-policy"], "same-origin");
	}

	#[tokio::test]
	async fn test_api_docs() {
		let app = app();
		let (status, _, doc) = send(&app, Method::GET, "/api-docs/swagger.json", None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(doc["openapi"], "3.0.0");

		let (status, headers, _) = send(&app, Method::GET, "/api-docs", None).await;
		assert_eq!(status, StatusCode::OK);
		assert!(headers[header::CONTENT_TYPE]
			.to_str()
			.unwrap()
			.starts_with("text/html"));
	}

	#[tokio::test]
	async fn test_rate_limiting() {
		let app = app_with(&ConfigBuilder::new().rate_limit(2, 60).build().api);

		for _ in 0..2 {
			let (status, _, _) = send(&app, Method::GET, "/api/v1/orders", None).await;
			assert_eq!(status, StatusCode::OK);
		}

		let (status, headers, body) = send(&app, Method::GET, "/api/v1/orders", None).await;
		assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
		assert_eq!(body["status"], "error");
		assert_eq!(
			body["message"],
			"Too many requests from this IP, please try again later"
		);
		assert!(body["retryAfter"].as_u64().unwrap() <= 60);
		assert!(headers.contains_key(header::RETRY_AFTER));

		let (status, _, _) = send(&app, Method::GET, "/health", None).await;
		assert_eq!(status, StatusCode::OK);
	}

	#[tokio::test]
	async fn test_permissive_cors_by_default() {
		let request = Request::builder()
			.method(Method::OPTIONS)
			.uri("/api/v1/orders")
			.header(header::ORIGIN, "http://example.com")
			.header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
			.body(Body::empty())
			.unwrap();

		let response = app().oneshot(request).await.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
		assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
	}

	#[tokio::test]
	async fn test_configured_cors_origin() {
		let config = ConfigBuilder::new()
			.cors(Some(CorsConfig {
				allowed_origins: vec!["http://allowed.example".to_string()],
				allowed_headers: vec!["content-type".to_string()],
				allowed_methods: vec!["get".to_string(), "post".to_string()],
			}))
			.build();
		let request = Request::builder()
			.uri("/health")
			.header(header::ORIGIN, "http://allowed.example")
			.body(Body::empty())
			.unwrap();

		let response = app_with(&config.api).oneshot(request).await.unwrap();
		assert_eq!(
			response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
			"http://allowed.example"
		);
	}

	#[test]
	fn test_invalid_cors_origin_rejected() {
		let cors = CorsConfig {
			allowed_origins: vec!["http://bad\norigin".to_string()],
			allowed_headers: Vec::new(),
			allowed_methods: Vec::new(),
		};
		assert!(matches!(
			build_cors(Some(&cors)),
			Err(ServerError::InvalidCorsOrigin(_))
		));
	}
}
