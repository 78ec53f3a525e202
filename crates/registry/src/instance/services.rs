use std::any::Any;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

/// Injection container: service name to type-erased shared value.
///
/// Trait objects are stored wrapped once more, e.g. an
/// `Arc<dyn RepositoryFactory>` is inserted as the value and looked up with
/// `service::<Arc<dyn RepositoryFactory>>`.
#[derive(Clone, Default)]
pub struct Services {
	entries: FxHashMap<Box<str>, Arc<dyn Any + Send + Sync>>,
}

impl Services {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder form of [`Services::insert`].
	pub fn with<T: Any + Send + Sync>(mut self, name: &str, service: T) -> Self {
		self.insert(name, service);
		self
	}

	pub fn insert<T: Any + Send + Sync>(&mut self, name: &str, service: T) {
		if self.entries.insert(Box::from(name), Arc::new(service)).is_some() {
			tracing::debug!(service = name, "Replaced service");
		}
	}

	pub fn get(&self, name: &str) -> Option<&(dyn Any + Send + Sync)> {
		self.entries.get(name).map(|s| s.as_ref())
	}

	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl fmt::Debug for Services {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut names: Vec<_> = self.entries.keys().collect();
		names.sort();
		f.debug_struct("Services").field("names", &names).finish()
	}
}
