//! Composition context: owns every registry plus the materialization cache.
//!
//! # Role
//!
//! The single entry point pages, plugins and the rendering layer talk to.
//! Tests construct a fresh context each; nothing here is process-global.
//!
//! # Invariants
//!
//! - Base components and extensions share one namespace.
//! - The cache is never invalidated implicitly. Registrations only affect
//!   builds that happen after them; a cached entry keeps serving its snapshot
//!   until [`CompositionContext::materialize_fresh`],
//!   [`CompositionContext::invalidate`] or [`CompositionContext::clear_cache`].

#[cfg(test)]
mod tests;

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::component::ComponentRegistry;
use crate::compose::Composer;
use crate::core::InsertAction;
use crate::def::{ComponentDef, MixinDef};
use crate::error::{CompositionError, Result};
use crate::extension::ExtensionResolver;
use crate::materialized::MaterializedComponent;
use crate::mixin::MixinRegistry;
use crate::overrides::OverrideRegistry;

#[derive(Default)]
pub struct CompositionContext {
	mixins: MixinRegistry,
	components: ComponentRegistry,
	overrides: OverrideRegistry,
	extensions: ExtensionResolver,
	cache: FxHashMap<Box<str>, Arc<MaterializedComponent>>,
}

impl CompositionContext {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register_mixin(&mut self, name: &str, def: MixinDef) -> InsertAction {
		self.mixins.register(name, def)
	}

	pub fn mixin(&self, name: &str) -> Option<Arc<MixinDef>> {
		self.mixins.get(name)
	}

	/// Registers a base component.
	///
	/// # Errors
	///
	/// [`CompositionError::DuplicateRegistration`] if the name is already a
	/// base component or an extension.
	pub fn register_component(&mut self, name: &str, def: ComponentDef) -> Result<()> {
		if self.extensions.contains(name) {
			return Err(CompositionError::DuplicateRegistration {
				name: name.to_string(),
				registry: "extensions",
			});
		}
		self.components.register(name, def)
	}

	/// Queues a patch for `name`; the target need not exist yet.
	///
	/// Returns the override's ordinal.
	pub fn override_component(&mut self, name: &str, patch: ComponentDef) -> u64 {
		self.overrides.add(name, patch)
	}

	/// Declares `name` as a derived variant of `parent`.
	///
	/// # Errors
	///
	/// [`CompositionError::DuplicateRegistration`] if `name` is taken.
	pub fn extend_component(&mut self, name: &str, parent: &str, patch: ComponentDef) -> Result<()> {
		if self.components.contains(name) {
			return Err(CompositionError::DuplicateRegistration {
				name: name.to_string(),
				registry: "components",
			});
		}
		self.extensions.extend(name, parent, patch)
	}

	/// True if `name` is a base component or an extension.
	pub fn is_registered(&self, name: &str) -> bool {
		self.components.contains(name) || self.extensions.contains(name)
	}

	/// Base components in registration order, then extensions.
	pub fn component_names(&self) -> Vec<&str> {
		self.components.names().chain(self.extensions.names()).collect()
	}

	/// Builds `name` without consulting or touching the cache.
	pub fn build(&self, name: &str) -> Result<MaterializedComponent> {
		Composer::new(&self.mixins, &self.components, &self.overrides, &self.extensions).build(name)
	}

	/// Returns the cached component or builds and caches it.
	pub fn materialize(&mut self, name: &str) -> Result<Arc<MaterializedComponent>> {
		if let Some(hit) = self.cache.get(name) {
			tracing::debug!(component = name, "Materialization cache hit");
			return Ok(Arc::clone(hit));
		}
		self.materialize_fresh(name)
	}

	/// Rebuilds `name` and replaces its cache entry.
	pub fn materialize_fresh(&mut self, name: &str) -> Result<Arc<MaterializedComponent>> {
		let component = Arc::new(self.build(name)?);
		self.cache.insert(Box::from(name), Arc::clone(&component));
		Ok(component)
	}

	/// Drops the cache entry for `name`; returns whether one existed.
	pub fn invalidate(&mut self, name: &str) -> bool {
		self.cache.remove(name).is_some()
	}

	pub fn is_cached(&self, name: &str) -> bool {
		self.cache.contains_key(name)
	}

	pub fn clear_cache(&mut self) {
		self.cache.clear();
	}

	/// Empties every registry, restarts override ordinals and drops the cache.
	pub fn reset(&mut self) {
		self.mixins.clear();
		self.components.clear();
		self.overrides.clear();
		self.extensions.clear();
		self.cache.clear();
		tracing::debug!("Composition context reset");
	}

	pub fn mixins(&self) -> &MixinRegistry {
		&self.mixins
	}

	pub fn components(&self) -> &ComponentRegistry {
		&self.components
	}

	pub fn overrides(&self) -> &OverrideRegistry {
		&self.overrides
	}

	pub fn extensions(&self) -> &ExtensionResolver {
		&self.extensions
	}
}
