//! Base component registry.
//!
//! Base definitions are stored once and never mutated. Duplicate names are
//! rejected; overrides and extensions live in their own registries and are
//! only combined with the base at materialization.

use std::sync::Arc;

use crate::core::RegistryIndex;
use crate::def::ComponentDef;
use crate::error::Result;

pub struct ComponentRegistry {
	index: RegistryIndex<ComponentDef>,
}

impl Default for ComponentRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl ComponentRegistry {
	pub fn new() -> Self {
		Self {
			index: RegistryIndex::new("components"),
		}
	}

	/// Stores a base definition.
	///
	/// # Errors
	///
	/// [`crate::CompositionError::DuplicateRegistration`] if `name` is taken.
	pub fn register(&mut self, name: &str, def: ComponentDef) -> Result<()> {
		self.index.insert(name, Arc::new(def))?;
		tracing::debug!(component = name, "Registered component");
		Ok(())
	}

	pub fn get(&self, name: &str) -> Option<Arc<ComponentDef>> {
		self.index.get(name).cloned()
	}

	pub fn contains(&self, name: &str) -> bool {
		self.index.contains(name)
	}

	pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
		self.index.names()
	}

	pub fn len(&self) -> usize {
		self.index.len()
	}

	pub fn is_empty(&self) -> bool {
		self.index.is_empty()
	}

	pub fn clear(&mut self) {
		self.index.clear();
	}
}
