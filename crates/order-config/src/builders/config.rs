//! Configuration builder for creating test and development configurations.
//!
//! This module provides utilities for constructing Config instances with
//! sensible defaults, particularly useful for testing scenarios.

use crate::{ApiConfig, Config, CorsConfig, RateLimitConfig, ServiceConfig, StorageConfig};
use std::collections::HashMap;

/// Builder for creating `Config` instances with a fluent API.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	service_id: String,
	storage_primary: String,
	api: ApiConfig,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	/// Creates a new `ConfigBuilder` with default values suitable for testing.
	///
	/// Rate limiting is disabled so tests can issue any number of requests.
	pub fn new() -> Self {
		Self {
			service_id: "test-service".to_string(),
			storage_primary: "memory".to_string(),
			api: ApiConfig {
				rate_limiting: RateLimitConfig {
					enabled: false,
					..RateLimitConfig::default()
				},
				..ApiConfig::default()
			},
		}
	}

	pub fn service_id(mut self, id: impl Into<String>) -> Self {
		self.service_id = id.into();
		self
	}

	pub fn storage_primary(mut self, primary: impl Into<String>) -> Self {
		self.storage_primary = primary.into();
		self
	}

	/// Enables rate limiting with the given budget.
	pub fn rate_limit(mut self, max_requests: u32, window_seconds: u64) -> Self {
		self.api.rate_limiting = RateLimitConfig {
			enabled: true,
			max_requests,
			window_seconds,
		};
		self
	}

	pub fn cors(mut self, cors: Option<CorsConfig>) -> Self {
		self.api.cors = cors;
		self
	}

	/// Builds the `Config`, registering an empty table for the primary storage.
	pub fn build(self) -> Config {
		let mut implementations = HashMap::new();
		implementations.insert(
			self.storage_primary.clone(),
			toml::Value::Table(toml::map::Map::new()),
		);

		Config {
			service: ServiceConfig {
				id: self.service_id,
			},
			storage: StorageConfig {
				primary: self.storage_primary,
				implementations,
			},
			api: self.api,
		}
	}
}
