//! API documentation.
//!
//! Serves an OpenAPI 3.0 document for the order routes and a Swagger UI page
//! that renders it.

use order_types::OrderStatus;
use serde_json::{json, Value};

/// Location of the OpenAPI document, referenced by the UI page.
pub const OPENAPI_PATH: &str = "/api-docs/swagger.json";

const SWAGGER_UI_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
	<meta charset="utf-8" />
	<title>Order Management API</title>
	<link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
	<div id="swagger-ui"></div>
	<script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
	<script>
		window.onload = () => {
			window.ui = SwaggerUIBundle({ url: "/api-docs/swagger.json", dom_id: "#swagger-ui" });
		};
	</script>
</body>
</html>
"##;

pub fn swagger_ui_page() -> &'static str {
	SWAGGER_UI_PAGE
}

/// Builds the OpenAPI document describing both API versions.
pub fn openapi_document() -> Value {
	let statuses: Vec<&str> = OrderStatus::ALL.iter().map(|s| s.as_str()).collect();

	let mut paths = serde_json::Map::new();
	for version in ["v1", "v2"] {
		let listing = if version == "v1" {
			json!({
				"summary": "Get all active orders",
				"tags": ["Orders"],
				"responses": {
					"200": {
						"description": "List of active orders",
						"content": { "application/json": { "schema": {
							"type": "array",
							"items": { "$ref": "#/components/schemas/Order" }
						}}}
					}
				}
			})
		} else {
			json!({
				"summary": "Get active orders, one page at a time",
				"tags": ["Orders"],
				"parameters": [
					{ "in": "query", "name": "page", "schema": { "type": "integer", "minimum": 1, "default": 1 } },
					{ "in": "query", "name": "limit", "schema": { "type": "integer", "minimum": 1, "maximum": 100, "default": 10 } }
				],
				"responses": {
					"200": {
						"description": "A page of active orders",
						"content": { "application/json": { "schema": {
							"$ref": "#/components/schemas/PaginatedOrders"
						}}}
					}
				}
			})
		};

		let create_schema = if version == "v1" {
			json!({ "type": "object", "required": ["item"], "properties": {
				"item": { "type": "string" }
			}})
		} else {
			json!({ "type": "object", "required": ["item"], "properties": {
				"item": { "type": "string" },
				"quantity": { "type": "integer", "minimum": 0 }
			}})
		};

		paths.insert(
			format!("/api/{}/orders", version),
			json!({
				"get": listing,
				"post": {
					"summary": "Create a new order",
					"tags": ["Orders"],
					"requestBody": {
						"required": true,
						"content": { "application/json": { "schema": create_schema } }
					},
					"responses": {
						"201": {
							"description": "Order created successfully",
							"content": { "application/json": { "schema": { "$ref": "#/components/schemas/Order" } } }
						},
						"400": { "$ref": "#/components/responses/Error" }
					}
				}
			}),
		);

		paths.insert(
			format!("/api/{}/orders/all", version),
			json!({
				"get": {
					"summary": "Get all orders",
					"tags": ["Orders"],
					"responses": {
						"200": {
							"description": "List of all orders",
							"content": { "application/json": { "schema": {
								"type": "array",
								"items": { "$ref": "#/components/schemas/Order" }
							}}}
						}
					}
				}
			}),
		);

		paths.insert(
			format!("/api/{}/orders/{{id}}", version),
			json!({
				"put": {
					"summary": "Update an order's status",
					"tags": ["Orders"],
					"parameters": [
						{ "in": "path", "name": "id", "required": true, "schema": { "type": "integer" } }
					],
					"requestBody": {
						"required": true,
						"content": { "application/json": { "schema": {
							"type": "object",
							"required": ["status"],
							"properties": { "status": { "type": "string", "enum": statuses } }
						}}}
					},
					"responses": {
						"200": {
							"description": "Order updated successfully",
							"content": { "application/json": { "schema": { "$ref": "#/components/schemas/Order" } } }
						},
						"400": { "$ref": "#/components/responses/Error" },
						"404": { "$ref": "#/components/responses/Error" }
					}
				}
			}),
		);
	}

	paths.insert(
		"/health".to_string(),
		json!({
			"get": {
				"summary": "Health check",
				"responses": {
					"200": {
						"description": "Service is healthy",
						"content": { "application/json": { "schema": {
							"type": "object",
							"properties": { "status": { "type": "string", "example": "healthy" } }
						}}}
					}
				}
			}
		}),
	);

	json!({
		"openapi": "3.0.0",
		"info": {
			"title": "Order Management API",
			"version": env!("CARGO_PKG_VERSION"),
			"description": "A simple order management system API"
		},
		"paths": paths,
		"components": {
			"schemas": {
				"Order": {
					"type": "object",
					"properties": {
						"id": { "type": "integer", "description": "The order ID" },
						"item": { "type": "string", "description": "The order item" },
						"status": { "type": "string", "enum": statuses },
						"createdAt": { "type": "string", "format": "date-time" },
						"updatedAt": { "type": "string", "format": "date-time" }
					}
				},
				"PaginatedOrders": {
					"type": "object",
					"properties": {
						"data": { "type": "array", "items": { "$ref": "#/components/schemas/Order" } },
						"pagination": {
							"type": "object",
							"properties": {
								"currentPage": { "type": "integer" },
								"itemsPerPage": { "type": "integer" },
								"totalItems": { "type": "integer" },
								"totalPages": { "type": "integer" }
							}
						}
					}
				},
				"Error": {
					"type": "object",
					"properties": {
						"status": { "type": "string", "example": "error" },
						"message": { "type": "string" }
					}
				}
			},
			"responses": {
				"Error": {
					"description": "Request failed",
					"content": { "application/json": { "schema": { "$ref": "#/components/schemas/Error" } } }
				}
			}
		}
	})
}
