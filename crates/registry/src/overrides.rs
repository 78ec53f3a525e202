//! Override registry: an append-only log of patches per target name.
//!
//! Targets do not need to exist when an override is registered; the patch is
//! simply held until the target is materialized. Every override receives an
//! ordinal from a registry-wide counter, so the relative order of any two
//! overrides is the order of their registration calls.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::def::ComponentDef;

/// A patch registered against a target component.
#[derive(Clone, Debug)]
pub struct OverrideDef {
	pub target: String,
	/// Global registration ordinal.
	pub ordinal: u64,
	pub patch: Arc<ComponentDef>,
}

#[derive(Default)]
pub struct OverrideRegistry {
	by_target: FxHashMap<Box<str>, Vec<OverrideDef>>,
	next_ordinal: u64,
}

impl OverrideRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a patch for `target` and returns its ordinal.
	pub fn add(&mut self, target: &str, patch: ComponentDef) -> u64 {
		let ordinal = self.next_ordinal;
		self.next_ordinal += 1;

		let list = self.by_target.entry(Box::from(target)).or_default();
		list.push(OverrideDef {
			target: target.to_string(),
			ordinal,
			patch: Arc::new(patch),
		});
		tracing::debug!(target_component = target, ordinal, count = list.len(), "Registered override");
		ordinal
	}

	/// Returns the overrides for `target` in registration order.
	pub fn get(&self, target: &str) -> &[OverrideDef] {
		self.by_target.get(target).map_or(&[], Vec::as_slice)
	}

	/// Total number of overrides across all targets.
	pub fn len(&self) -> usize {
		self.by_target.values().map(Vec::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.by_target.values().all(Vec::is_empty)
	}

	/// Drops every override and restarts ordinals at zero.
	pub fn clear(&mut self) {
		self.by_target.clear();
		self.next_ordinal = 0;
	}
}
