//! Page slicing over an already ordered sequence.
//!
//! Page and limit arrive as raw query text and are normalized before use, so
//! nothing in this module can fail.

use order_types::{PaginatedResponse, PaginationMeta};

/// Page number used when the caller sends none or an unusable value.
pub const DEFAULT_PAGE: u64 = 1;
/// Page size used when the caller sends none or an unusable value.
pub const DEFAULT_LIMIT: u64 = 10;
/// Largest page size a caller may request.
pub const MAX_LIMIT: u64 = 100;

/// Normalized pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
	page: u64,
	limit: u64,
}

impl Default for PageRequest {
	fn default() -> Self {
		Self {
			page: DEFAULT_PAGE,
			limit: DEFAULT_LIMIT,
		}
	}
}

impl PageRequest {
	/// Builds a request from already numeric values, clamping them.
	pub fn new(page: u64, limit: u64) -> Self {
		Self {
			page: page.max(1),
			limit: limit.clamp(1, MAX_LIMIT),
		}
	}

	/// Normalizes raw query values.
	///
	/// Missing, unparseable or zero values take the default. The result is
	/// then clamped: `page >= 1` and `1 <= limit <= MAX_LIMIT`. A negative
	/// limit therefore becomes 1 while `limit=0` becomes the default.
	pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
		let page = parse_or_default(page, DEFAULT_PAGE);
		let limit = parse_or_default(limit, DEFAULT_LIMIT);

		Self {
			page: clamp_to_u64(page, 1, u64::MAX),
			limit: clamp_to_u64(limit, 1, MAX_LIMIT),
		}
	}

	pub fn page(&self) -> u64 {
		self.page
	}

	pub fn limit(&self) -> u64 {
		self.limit
	}

	/// Index of the first element on this page.
	pub fn start_index(&self) -> u64 {
		(self.page - 1).saturating_mul(self.limit)
	}
}

fn parse_or_default(raw: Option<&str>, default: u64) -> i128 {
	match raw.and_then(|value| value.trim().parse::<i128>().ok()) {
		Some(0) | None => default as i128,
		Some(value) => value,
	}
}

fn clamp_to_u64(value: i128, min: u64, max: u64) -> u64 {
	value.clamp(min as i128, max as i128) as u64
}

/// Slices `items` according to `request` and describes the result.
///
/// A page past the end yields empty data with the metadata still filled in.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> PaginatedResponse<T> {
	let total_items = items.len() as u64;
	let start = usize::try_from(request.start_index()).unwrap_or(usize::MAX);
	let limit = usize::try_from(request.limit()).unwrap_or(usize::MAX);

	let data: Vec<T> = items.into_iter().skip(start).take(limit).collect();

	PaginatedResponse {
		data,
		pagination: PaginationMeta {
			current_page: request.page(),
			items_per_page: request.limit(),
			total_items,
			total_pages: total_items.div_ceil(request.limit()),
		},
	}
}
