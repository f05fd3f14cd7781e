//! Registry trait for named, configurable implementations.

/// Base trait for implementation registries.
///
/// Each backend module provides a `Registry` struct implementing this trait,
/// declaring the name it is configured under and the factory that builds it.
pub trait ImplementationRegistry {
	/// The key used under `implementations` in configuration, for example
	/// `"memory"` for `storage.implementations.memory`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
