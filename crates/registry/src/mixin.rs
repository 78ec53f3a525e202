//! Mixin registry.
//!
//! Stores named [`MixinDef`]s. Re-registering a name replaces the previous
//! definition (last-write-wins); components pick up whichever definition is
//! current when they are materialized.

use std::sync::Arc;

use crate::core::{InsertAction, RegistryIndex};
use crate::def::MixinDef;

pub struct MixinRegistry {
	index: RegistryIndex<MixinDef>,
}

impl Default for MixinRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl MixinRegistry {
	pub fn new() -> Self {
		Self {
			index: RegistryIndex::new("mixins"),
		}
	}

	/// Stores or replaces a mixin.
	pub fn register(&mut self, name: &str, def: MixinDef) -> InsertAction {
		let action = self.index.upsert(name, Arc::new(def));
		if action == InsertAction::ReplacedExisting {
			tracing::debug!(mixin = name, "Replaced mixin definition");
		} else {
			tracing::debug!(mixin = name, "Registered mixin");
		}
		action
	}

	/// Returns the current definition, or `None` if the name is unknown.
	pub fn get(&self, name: &str) -> Option<Arc<MixinDef>> {
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
