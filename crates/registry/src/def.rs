//! Declarative definitions: mixins, components and the partial patches used by
//! overrides and extensions.
//!
//! A [`ComponentDef`] has every field optional or empty by default, so one type
//! describes a full base component, an override patch and an extension patch.
//! Definitions are immutable once handed to a registry; they are shared as
//! `Arc`s and only ever read by the composer.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use mosaic_template::Template;
use serde_json::Value;

use crate::error::InvokeError;
use crate::instance::Instance;

/// Component state: one JSON object per instance.
pub type Data = serde_json::Map<String, Value>;

/// A method body. Receives the instance (`this`) and positional arguments.
pub type MethodFn = Arc<dyn Fn(&mut Instance, &[Value]) -> Result<Value, InvokeError> + Send + Sync>;

/// A computed property, evaluated on demand against the instance.
pub type ComputedFn = Arc<dyn Fn(&Instance) -> Result<Value, InvokeError> + Send + Sync>;

/// A lifecycle hook.
pub type HookFn = Arc<dyn Fn(&mut Instance) -> Result<(), InvokeError> + Send + Sync>;

/// A data initializer producing the keys this layer contributes.
pub type DataFn = Arc<dyn Fn() -> Data + Send + Sync>;

/// Lifecycle stages a hook can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lifecycle {
	BeforeCreate,
	Created,
	BeforeMount,
	Mounted,
	BeforeUpdate,
	Updated,
	BeforeDestroy,
	Destroyed,
}

impl Lifecycle {
	pub const ALL: [Lifecycle; 8] = [
		Self::BeforeCreate,
		Self::Created,
		Self::BeforeMount,
		Self::Mounted,
		Self::BeforeUpdate,
		Self::Updated,
		Self::BeforeDestroy,
		Self::Destroyed,
	];

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::BeforeCreate => "beforeCreate",
			Self::Created => "created",
			Self::BeforeMount => "beforeMount",
			Self::Mounted => "mounted",
			Self::BeforeUpdate => "beforeUpdate",
			Self::Updated => "updated",
			Self::BeforeDestroy => "beforeDestroy",
			Self::Destroyed => "destroyed",
		}
	}
}

impl fmt::Display for Lifecycle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Lifecycle {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|stage| stage.as_str() == s)
			.ok_or_else(|| format!("unknown lifecycle stage '{s}'"))
	}
}

/// A keyboard shortcut bound to a method.
#[derive(Clone)]
pub struct Shortcut {
	/// Method invoked when the shortcut fires.
	pub method: String,
	/// Optional predicate; the shortcut is inert while it evaluates falsy.
	pub active: Option<ComputedFn>,
}

impl Shortcut {
	pub fn new(method: impl Into<String>) -> Self {
		Self {
			method: method.into(),
			active: None,
		}
	}

	pub fn active_when(
		mut self,
		f: impl Fn(&Instance) -> Result<Value, InvokeError> + Send + Sync + 'static,
	) -> Self {
		self.active = Some(Arc::new(f));
		self
	}
}

impl fmt::Debug for Shortcut {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Shortcut")
			.field("method", &self.method)
			.field("conditional", &self.active.is_some())
			.finish()
	}
}

/// Behavior shared by mixins and components.
#[derive(Clone, Default)]
pub struct Behavior {
	/// Injected service names.
	pub inject: Vec<String>,
	pub data: Option<DataFn>,
	pub methods: IndexMap<String, MethodFn>,
	pub computed: IndexMap<String, ComputedFn>,
	/// Hooks in declaration order; several per stage are allowed.
	pub hooks: Vec<(Lifecycle, HookFn)>,
}

impl Behavior {
	pub fn is_empty(&self) -> bool {
		self.inject.is_empty()
			&& self.data.is_none()
			&& self.methods.is_empty()
			&& self.computed.is_empty()
			&& self.hooks.is_empty()
	}
}

impl fmt::Debug for Behavior {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Behavior")
			.field("inject", &self.inject)
			.field("data", &self.data.is_some())
			.field("methods", &self.methods.keys().collect::<Vec<_>>())
			.field("computed", &self.computed.keys().collect::<Vec<_>>())
			.field("hooks", &self.hooks.iter().map(|(s, _)| *s).collect::<Vec<_>>())
			.finish()
	}
}

macro_rules! behavior_builders {
	($ty:ty) => {
		impl $ty {
			/// Declares an injected service name.
			pub fn inject(mut self, name: impl Into<String>) -> Self {
				let name = name.into();
				if !self.behavior.inject.contains(&name) {
					self.behavior.inject.push(name);
				}
				self
			}

			/// Sets the data initializer.
			pub fn data(mut self, f: impl Fn() -> Data + Send + Sync + 'static) -> Self {
				self.behavior.data = Some(Arc::new(f));
				self
			}

			/// Sets a data initializer returning a copy of `value`.
			///
			/// Non-object values contribute no keys.
			pub fn data_value(self, value: Value) -> Self {
				let data = match value {
					Value::Object(map) => map,
					_ => Data::new(),
				};
				self.data(move || data.clone())
			}

			pub fn method(
				mut self,
				name: impl Into<String>,
				f: impl Fn(&mut Instance, &[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
			) -> Self {
				self.behavior.methods.insert(name.into(), Arc::new(f));
				self
			}

			/// Adds an already shared method body.
			pub fn method_fn(mut self, name: impl Into<String>, f: MethodFn) -> Self {
				self.behavior.methods.insert(name.into(), f);
				self
			}

			pub fn computed(
				mut self,
				name: impl Into<String>,
				f: impl Fn(&Instance) -> Result<Value, InvokeError> + Send + Sync + 'static,
			) -> Self {
				self.behavior.computed.insert(name.into(), Arc::new(f));
				self
			}

			pub fn computed_fn(mut self, name: impl Into<String>, f: ComputedFn) -> Self {
				self.behavior.computed.insert(name.into(), f);
				self
			}

			pub fn hook(
				mut self,
				stage: Lifecycle,
				f: impl Fn(&mut Instance) -> Result<(), InvokeError> + Send + Sync + 'static,
			) -> Self {
				self.behavior.hooks.push((stage, Arc::new(f)));
				self
			}

			pub fn hook_fn(mut self, stage: Lifecycle, f: HookFn) -> Self {
				self.behavior.hooks.push((stage, f));
				self
			}

			pub fn behavior(&self) -> &Behavior {
				&self.behavior
			}
		}
	};
}

/// A named, reusable bundle of behavior.
///
/// Mixins are atomic: they cannot reference other mixins and are consumed
/// wholesale by the composer.
#[derive(Clone, Default, Debug)]
pub struct MixinDef {
	pub behavior: Behavior,
}

impl MixinDef {
	pub fn new() -> Self {
		Self::default()
	}
}

behavior_builders!(MixinDef);

/// A component definition or partial patch.
#[derive(Clone, Default, Debug)]
pub struct ComponentDef {
	pub template: Option<Template>,
	/// Mixin names, resolved at materialization.
	pub mixins: Vec<String>,
	pub shortcuts: IndexMap<String, Shortcut>,
	pub behavior: Behavior,
}

impl ComponentDef {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn template(mut self, template: Template) -> Self {
		self.template = Some(template);
		self
	}

	/// Appends a mixin by name.
	pub fn mixin(mut self, name: impl Into<String>) -> Self {
		self.mixins.push(name.into());
		self
	}

	pub fn shortcut(mut self, key: impl Into<String>, shortcut: Shortcut) -> Self {
		self.shortcuts.insert(key.into(), shortcut);
		self
	}

	/// True when the patch contributes nothing.
	pub fn is_empty(&self) -> bool {
		self.template.is_none()
			&& self.mixins.is_empty()
			&& self.shortcuts.is_empty()
			&& self.behavior.is_empty()
	}
}

behavior_builders!(ComponentDef);
