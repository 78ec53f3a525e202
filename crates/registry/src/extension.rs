//! Extension resolver.
//!
//! `extend(name, parent, patch)` declares `name` as a derived variant of
//! `parent`. The patch is stored as-is: nothing is flattened at declaration
//! time, so overrides registered against the parent later still reach every
//! descendant when the descendant is materialized.
//!
//! # Invariants
//!
//! - A chain returned by [`ExtensionResolver::resolve_chain`] starts at a base
//!   component and ends at the requested name.
//! - Walking parent pointers never visits a name twice; a revisit is reported
//!   as [`CompositionError::CyclicExtension`].

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::component::ComponentRegistry;
use crate::core::RegistryIndex;
use crate::def::ComponentDef;
use crate::error::{CompositionError, Result};

/// A derived component declaration.
#[derive(Clone, Debug)]
pub struct ExtensionDef {
	pub name: String,
	pub parent: String,
	pub patch: Arc<ComponentDef>,
}

/// What kind of definition a chain link starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkKind {
	Base,
	Extension,
}

/// One step of a resolved extension chain.
#[derive(Clone, Debug)]
pub struct ChainLink {
	pub name: String,
	pub kind: LinkKind,
	/// The base definition, or the patch recorded at extend time.
	pub def: Arc<ComponentDef>,
}

pub struct ExtensionResolver {
	index: RegistryIndex<ExtensionDef>,
}

impl Default for ExtensionResolver {
	fn default() -> Self {
		Self::new()
	}
}

impl ExtensionResolver {
	pub fn new() -> Self {
		Self {
			index: RegistryIndex::new("extensions"),
		}
	}

	/// Records `name` as an extension of `parent`.
	///
	/// The parent does not have to exist yet; it is resolved when the chain is.
	pub fn extend(&mut self, name: &str, parent: &str, patch: ComponentDef) -> Result<()> {
		let def = ExtensionDef {
			name: name.to_string(),
			parent: parent.to_string(),
			patch: Arc::new(patch),
		};
		self.index.insert(name, Arc::new(def))?;
		tracing::debug!(component = name, parent, "Registered extension");
		Ok(())
	}

	pub fn get(&self, name: &str) -> Option<&Arc<ExtensionDef>> {
		self.index.get(name)
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

	/// Walks parent pointers from `name` to its base component.
	///
	/// Returns the chain root first. A name with no parent yields a single link.
	pub fn resolve_chain(&self, name: &str, components: &ComponentRegistry) -> Result<Vec<ChainLink>> {
		let mut links = Vec::new();
		let mut walked: Vec<String> = Vec::new();
		let mut visited: FxHashSet<&str> = FxHashSet::default();
		let mut current = name;
		let mut referenced_by: Option<&str> = None;

		loop {
			walked.push(current.to_string());
			if !visited.insert(current) {
				return Err(CompositionError::CyclicExtension { chain: walked });
			}

			if let Some(ext) = self.index.get(current) {
				links.push(ChainLink {
					name: ext.name.clone(),
					kind: LinkKind::Extension,
					def: Arc::clone(&ext.patch),
				});
				referenced_by = Some(current);
				current = &ext.parent;
				continue;
			}

			let Some(base) = components.get(current) else {
				return Err(CompositionError::UnknownComponent {
					name: current.to_string(),
					referenced_by: referenced_by.map(str::to_string),
				});
			};
			links.push(ChainLink {
				name: current.to_string(),
				kind: LinkKind::Base,
				def: base,
			});
			break;
		}

		links.reverse();
		Ok(links)
	}
}
