//! The final, self-contained component produced by the composer.
//!
//! A [`MaterializedComponent`] is a snapshot: it owns its merged tables and
//! shares only immutable function objects with the registries, so later
//! registrations never change a component that was already built.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use mosaic_template::Template;
use serde::Serialize;

use crate::def::{ComputedFn, Data, DataFn, HookFn, Lifecycle, MethodFn, Shortcut};

/// Identifies the contribution a merged entry came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerOrigin {
	Mixin { name: String },
	Component { name: String },
	Extension { name: String },
	Override { target: String, ordinal: u64 },
}

impl LayerOrigin {
	/// The registry name the layer belongs to.
	pub fn name(&self) -> &str {
		match self {
			Self::Mixin { name } | Self::Component { name } | Self::Extension { name } => name,
			Self::Override { target, .. } => target,
		}
	}
}

impl fmt::Display for LayerOrigin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Mixin { name } => write!(f, "mixin:{name}"),
			Self::Component { name } => write!(f, "component:{name}"),
			Self::Extension { name } => write!(f, "extension:{name}"),
			Self::Override { target, ordinal } => write!(f, "override:{target}#{ordinal}"),
		}
	}
}

#[derive(Clone)]
pub struct MethodImpl {
	pub origin: LayerOrigin,
	pub func: MethodFn,
}

/// Every implementation contributed for one method key, lowest first.
///
/// The last entry is the effective method; the entries beneath it are what
/// super calls walk down through.
#[derive(Clone, Default)]
pub struct MethodStack {
	pub(crate) impls: Vec<MethodImpl>,
}

impl MethodStack {
	pub fn top(&self) -> Option<&MethodImpl> {
		self.impls.last()
	}

	pub fn get(&self, level: usize) -> Option<&MethodImpl> {
		self.impls.get(level)
	}

	pub fn depth(&self) -> usize {
		self.impls.len()
	}

	pub fn origins(&self) -> impl Iterator<Item = &LayerOrigin> + '_ {
		self.impls.iter().map(|i| &i.origin)
	}
}

#[derive(Clone)]
pub struct ComputedEntry {
	pub origin: LayerOrigin,
	pub func: ComputedFn,
}

#[derive(Clone)]
pub struct HookEntry {
	pub origin: LayerOrigin,
	pub func: HookFn,
}

#[derive(Clone)]
pub struct DataLayer {
	pub origin: LayerOrigin,
	pub init: DataFn,
}

pub struct MaterializedComponent {
	pub(crate) name: String,
	pub(crate) chain: Vec<String>,
	pub(crate) template: Option<Template>,
	pub(crate) mixins: Vec<String>,
	pub(crate) inject: Vec<String>,
	pub(crate) data: Vec<DataLayer>,
	pub(crate) methods: IndexMap<String, MethodStack>,
	pub(crate) computed: IndexMap<String, ComputedEntry>,
	pub(crate) hooks: BTreeMap<Lifecycle, Vec<HookEntry>>,
	pub(crate) shortcuts: IndexMap<String, Shortcut>,
	pub(crate) layers: Vec<LayerOrigin>,
}

impl MaterializedComponent {
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Names of the extension chain, root first, ending with this component.
	pub fn chain(&self) -> &[String] {
		&self.chain
	}

	pub fn template(&self) -> Option<&Template> {
		self.template.as_ref()
	}

	/// Every mixin applied anywhere in the chain, first-seen order.
	pub fn mixins(&self) -> &[String] {
		&self.mixins
	}

	pub fn inject(&self) -> &[String] {
		&self.inject
	}

	pub fn injects(&self, service: &str) -> bool {
		self.inject.iter().any(|s| s == service)
	}

	pub fn method(&self, name: &str) -> Option<&MethodStack> {
		self.methods.get(name)
	}

	pub fn has_method(&self, name: &str) -> bool {
		self.methods.contains_key(name)
	}

	pub fn method_names(&self) -> impl Iterator<Item = &str> + '_ {
		self.methods.keys().map(String::as_str)
	}

	pub fn computed(&self, name: &str) -> Option<&ComputedEntry> {
		self.computed.get(name)
	}

	pub fn computed_names(&self) -> impl Iterator<Item = &str> + '_ {
		self.computed.keys().map(String::as_str)
	}

	/// Hooks for one stage, in execution order.
	pub fn hooks(&self, stage: Lifecycle) -> &[HookEntry] {
		self.hooks.get(&stage).map_or(&[], Vec::as_slice)
	}

	pub fn shortcut(&self, key: &str) -> Option<&Shortcut> {
		self.shortcuts.get(key)
	}

	pub fn shortcuts(&self) -> impl Iterator<Item = (&str, &Shortcut)> + '_ {
		self.shortcuts.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn data_layers(&self) -> &[DataLayer] {
		&self.data
	}

	/// Every layer applied, in application order.
	pub fn layers(&self) -> &[LayerOrigin] {
		&self.layers
	}

	/// Evaluates the data layers in order; later keys overwrite earlier ones.
	pub fn initial_data(&self) -> Data {
		let mut data = Data::new();
		for layer in &self.data {
			data.extend((layer.init)());
		}
		data
	}

	/// A serializable description of the merged result.
	pub fn summary(&self) -> ComponentSummary {
		ComponentSummary {
			name: self.name.clone(),
			chain: self.chain.clone(),
			mixins: self.mixins.clone(),
			inject: self.inject.clone(),
			data: self.initial_data(),
			methods: self
				.methods
				.iter()
				.map(|(name, stack)| MethodSummary {
					name: name.clone(),
					origins: stack.origins().map(ToString::to_string).collect(),
				})
				.collect(),
			computed: self
				.computed
				.iter()
				.map(|(name, entry)| (name.clone(), entry.origin.to_string()))
				.collect(),
			hooks: self
				.hooks
				.iter()
				.map(|(stage, hooks)| {
					(
						stage.to_string(),
						hooks.iter().map(|h| h.origin.to_string()).collect(),
					)
				})
				.collect(),
			shortcuts: self
				.shortcuts
				.iter()
				.map(|(key, s)| (key.clone(), s.method.clone()))
				.collect(),
			template_blocks: self
				.template
				.as_ref()
				.map(|t| t.block_names().into_iter().map(str::to_string).collect())
				.unwrap_or_default(),
			layers: self.layers.iter().map(ToString::to_string).collect(),
		}
	}
}

impl fmt::Debug for MaterializedComponent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MaterializedComponent")
			.field("name", &self.name)
			.field("chain", &self.chain)
			.field("mixins", &self.mixins)
			.field("methods", &self.methods.keys().collect::<Vec<_>>())
			.field("layers", &self.layers.len())
			.finish_non_exhaustive()
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodSummary {
	pub name: String,
	/// Contributing layers, lowest first; the last one is effective.
	pub origins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSummary {
	pub name: String,
	pub chain: Vec<String>,
	pub mixins: Vec<String>,
	pub inject: Vec<String>,
	pub data: Data,
	pub methods: Vec<MethodSummary>,
	pub computed: BTreeMap<String, String>,
	pub hooks: BTreeMap<String, Vec<String>>,
	pub shortcuts: BTreeMap<String, String>,
	pub template_blocks: Vec<String>,
	pub layers: Vec<String>,
}
