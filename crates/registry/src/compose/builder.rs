//! Field-wise merging of ordered layers into a [`MaterializedComponent`].
//!
//! | Field     | Rule                                              |
//! |-----------|---------------------------------------------------|
//! | template  | block inheritance, first template is the skeleton |
//! | methods   | key-wise override, implementation stack kept      |
//! | computed  | key-wise override                                 |
//! | data      | ordered initializer layers                        |
//! | hooks     | chained per stage in contribution order           |
//! | inject    | ordered union                                     |
//! | shortcuts | key-wise override                                 |
//! | mixins    | flattened first-seen list                         |

use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;
use mosaic_template::Template;

use crate::def::{Behavior, ComponentDef, Lifecycle, MixinDef, Shortcut};
use crate::materialized::{
	ComputedEntry, DataLayer, HookEntry, LayerOrigin, MaterializedComponent, MethodImpl, MethodStack,
};

/// The definition a layer contributes.
#[derive(Clone, Copy)]
pub enum LayerDef<'a> {
	Mixin(&'a MixinDef),
	Component(&'a ComponentDef),
}

/// One contribution fed to the builder.
#[derive(Clone)]
pub struct Layer<'a> {
	pub origin: LayerOrigin,
	pub def: LayerDef<'a>,
}

impl<'a> Layer<'a> {
	pub fn mixin(name: &str, def: &'a MixinDef) -> Self {
		Self {
			origin: LayerOrigin::Mixin { name: name.to_string() },
			def: LayerDef::Mixin(def),
		}
	}

	pub fn component(origin: LayerOrigin, def: &'a ComponentDef) -> Self {
		Self {
			origin,
			def: LayerDef::Component(def),
		}
	}
}

/// Accumulates layers in order; [`ComponentBuilder::finish`] freezes the result.
pub struct ComponentBuilder {
	name: String,
	template: Option<Template>,
	mixins: Vec<String>,
	inject: Vec<String>,
	data: Vec<DataLayer>,
	methods: IndexMap<String, MethodStack>,
	computed: IndexMap<String, ComputedEntry>,
	hooks: BTreeMap<Lifecycle, Vec<HookEntry>>,
	shortcuts: IndexMap<String, Shortcut>,
	layers: Vec<LayerOrigin>,
}

impl ComponentBuilder {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			template: None,
			mixins: Vec::new(),
			inject: Vec::new(),
			data: Vec::new(),
			methods: IndexMap::new(),
			computed: IndexMap::new(),
			hooks: BTreeMap::new(),
			shortcuts: IndexMap::new(),
			layers: Vec::new(),
		}
	}

	pub fn layer_count(&self) -> usize {
		self.layers.len()
	}

	pub fn apply(&mut self, layer: Layer<'_>) {
		match layer.def {
			LayerDef::Mixin(def) => {
				if !self.mixins.iter().any(|m| m == layer.origin.name()) {
					self.mixins.push(layer.origin.name().to_string());
				}
				self.merge_behavior(&layer.origin, &def.behavior);
			}
			LayerDef::Component(def) => {
				if let Some(template) = &def.template {
					self.template = Some(match self.template.take() {
						Some(base) => base.inherit(template),
						None => template.clone(),
					});
				}
				for (key, shortcut) in &def.shortcuts {
					self.shortcuts.insert(key.clone(), shortcut.clone());
				}
				self.merge_behavior(&layer.origin, &def.behavior);
			}
		}

		tracing::trace!(
			component = %self.name,
			origin = %layer.origin,
			methods = self.methods.len(),
			"Applied layer"
		);
		self.layers.push(layer.origin);
	}

	fn merge_behavior(&mut self, origin: &LayerOrigin, behavior: &Behavior) {
		for service in &behavior.inject {
			if !self.inject.contains(service) {
				self.inject.push(service.clone());
			}
		}

		if let Some(init) = &behavior.data {
			self.data.push(DataLayer {
				origin: origin.clone(),
				init: Arc::clone(init),
			});
		}

		for (name, func) in &behavior.methods {
			self.methods.entry(name.clone()).or_default().impls.push(MethodImpl {
				origin: origin.clone(),
				func: Arc::clone(func),
			});
		}

		for (name, func) in &behavior.computed {
			self.computed.insert(
				name.clone(),
				ComputedEntry {
					origin: origin.clone(),
					func: Arc::clone(func),
				},
			);
		}

		for (stage, func) in &behavior.hooks {
			let chain = self.hooks.entry(*stage).or_default();
			// A mixin reached through several links contributes its hook once.
			if matches!(origin, LayerOrigin::Mixin { .. })
				&& chain
					.iter()
					.any(|h| matches!(h.origin, LayerOrigin::Mixin { .. }) && Arc::ptr_eq(&h.func, func))
			{
				continue;
			}
			chain.push(HookEntry {
				origin: origin.clone(),
				func: Arc::clone(func),
			});
		}
	}

	pub fn finish(self, chain: Vec<String>) -> MaterializedComponent {
		MaterializedComponent {
			name: self.name,
			chain,
			template: self.template,
			mixins: self.mixins,
			inject: self.inject,
			data: self.data,
			methods: self.methods,
			computed: self.computed,
			hooks: self.hooks,
			shortcuts: self.shortcuts,
			layers: self.layers,
		}
	}
}
