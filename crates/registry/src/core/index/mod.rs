//! Name-keyed definition storage.
//!
//! # Role
//!
//! [`RegistryIndex`] is the storage behind the mixin registry, the component
//! registry and the extension resolver. It maps a name to a shared,
//! immutable definition and remembers registration order so iteration is
//! deterministic.
//!
//! # Duplicate Handling
//!
//! The owning registry picks the operation:
//!
//! - [`RegistryIndex::insert`]: a second registration under the same name
//!   fails with [`CompositionError::DuplicateRegistration`] and leaves the
//!   index unchanged. Used for components and extensions.
//! - [`RegistryIndex::upsert`]: the new definition replaces the old one in
//!   place (the name keeps its original position). Used for mixins.
//!
//! # Invariants
//!
//! - `order` and `by_name` always hold the same set of names.
//! - Stored definitions are never mutated; replacement swaps the `Arc`.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::CompositionError;


/// Result of a successful insertion.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InsertAction {
	/// Name was new; definition inserted.
	InsertedNew,
	/// Name existed; replaced with the new definition.
	ReplacedExisting,
}

/// Name to definition map with stable registration order.
pub struct RegistryIndex<T> {
	label: &'static str,
	by_name: FxHashMap<Box<str>, Arc<T>>,
	order: Vec<Box<str>>,
}

impl<T> RegistryIndex<T> {
	/// Creates an empty index. `label` names the registry in errors and logs.
	pub fn new(label: &'static str) -> Self {
		Self {
			label,
			by_name: FxHashMap::default(),
			order: Vec::new(),
		}
	}

	pub fn label(&self) -> &'static str {
		self.label
	}

	/// Inserts a definition under a new `name`.
	///
	/// # Errors
	///
	/// [`CompositionError::DuplicateRegistration`] if `name` is already taken.
	pub fn insert(&mut self, name: &str, def: Arc<T>) -> Result<(), CompositionError> {
		if self.by_name.contains_key(name) {
			return Err(CompositionError::DuplicateRegistration {
				name: name.to_string(),
				registry: self.label,
			});
		}
		self.by_name.insert(Box::from(name), def);
		self.order.push(Box::from(name));
		Ok(())
	}

	/// Inserts or replaces `name`, keeping its original position.
	pub fn upsert(&mut self, name: &str, def: Arc<T>) -> InsertAction {
		match self.by_name.get_mut(name) {
			Some(slot) => {
				*slot = def;
				InsertAction::ReplacedExisting
			}
			None => {
				self.by_name.insert(Box::from(name), def);
				self.order.push(Box::from(name));
				InsertAction::InsertedNew
			}
		}
	}

	/// Looks up a definition by name.
	#[inline]
	pub fn get(&self, name: &str) -> Option<&Arc<T>> {
		self.by_name.get(name)
	}

	#[inline]
	pub fn contains(&self, name: &str) -> bool {
		self.by_name.contains_key(name)
	}

	/// Returns names in registration order.
	pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
		self.order.iter().map(|n| &**n)
	}

	/// Returns `(name, definition)` pairs in registration order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<T>)> + '_ {
		self.order
			.iter()
			.filter_map(|n| self.by_name.get(n).map(|def| (&**n, def)))
	}

	pub fn len(&self) -> usize {
		self.order.len()
	}

	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	/// Drops every definition.
	pub fn clear(&mut self) {
		self.by_name.clear();
		self.order.clear();
	}
}
