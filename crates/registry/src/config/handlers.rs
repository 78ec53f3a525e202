//! Named Rust behavior that declarations link against.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::Value;

use super::{ConfigError, Result};
use crate::def::{ComputedFn, Data, DataFn, HookFn, MethodFn};
use crate::error::InvokeError;
use crate::instance::Instance;

/// Which table a handler name is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
	Method,
	Computed,
	Hook,
	Data,
}

impl fmt::Display for HandlerKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Method => "method",
			Self::Computed => "computed",
			Self::Hook => "hook",
			Self::Data => "data",
		})
	}
}

/// Handler names to function objects, one namespace per [`HandlerKind`].
#[derive(Clone, Default)]
pub struct HandlerTable {
	methods: FxHashMap<String, MethodFn>,
	computed: FxHashMap<String, ComputedFn>,
	hooks: FxHashMap<String, HookFn>,
	data: FxHashMap<String, DataFn>,
}

impl HandlerTable {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn method(
		mut self,
		name: impl Into<String>,
		f: impl Fn(&mut Instance, &[Value]) -> std::result::Result<Value, InvokeError> + Send + Sync + 'static,
	) -> Self {
		self.methods.insert(name.into(), Arc::new(f));
		self
	}

	pub fn computed(
		mut self,
		name: impl Into<String>,
		f: impl Fn(&Instance) -> std::result::Result<Value, InvokeError> + Send + Sync + 'static,
	) -> Self {
		self.computed.insert(name.into(), Arc::new(f));
		self
	}

	pub fn hook(
		mut self,
		name: impl Into<String>,
		f: impl Fn(&mut Instance) -> std::result::Result<(), InvokeError> + Send + Sync + 'static,
	) -> Self {
		self.hooks.insert(name.into(), Arc::new(f));
		self
	}

	pub fn data(mut self, name: impl Into<String>, f: impl Fn() -> Data + Send + Sync + 'static) -> Self {
		self.data.insert(name.into(), Arc::new(f));
		self
	}

	/// Adds every handler of `other`; entries in `other` win on collision.
	pub fn merge(&mut self, other: HandlerTable) {
		self.methods.extend(other.methods);
		self.computed.extend(other.computed);
		self.hooks.extend(other.hooks);
		self.data.extend(other.data);
	}

	pub fn contains(&self, kind: HandlerKind, name: &str) -> bool {
		match kind {
			HandlerKind::Method => self.methods.contains_key(name),
			HandlerKind::Computed => self.computed.contains_key(name),
			HandlerKind::Hook => self.hooks.contains_key(name),
			HandlerKind::Data => self.data.contains_key(name),
		}
	}

	pub fn len(&self) -> usize {
		self.methods.len() + self.computed.len() + self.hooks.len() + self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub(crate) fn resolve_method(&self, name: &str) -> Result<MethodFn> {
		lookup(&self.methods, HandlerKind::Method, name)
	}

	pub(crate) fn resolve_computed(&self, name: &str) -> Result<ComputedFn> {
		lookup(&self.computed, HandlerKind::Computed, name)
	}

	pub(crate) fn resolve_hook(&self, name: &str) -> Result<HookFn> {
		lookup(&self.hooks, HandlerKind::Hook, name)
	}

	pub(crate) fn resolve_data(&self, name: &str) -> Result<DataFn> {
		lookup(&self.data, HandlerKind::Data, name)
	}
}

fn lookup<F: ?Sized>(table: &FxHashMap<String, Arc<F>>, kind: HandlerKind, name: &str) -> Result<Arc<F>> {
	table.get(name).cloned().ok_or_else(|| ConfigError::UnknownHandler {
		kind,
		name: name.to_string(),
	})
}

impl fmt::Debug for HandlerTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HandlerTable")
			.field("methods", &self.methods.len())
			.field("computed", &self.computed.len())
			.field("hooks", &self.hooks.len())
			.field("data", &self.data.len())
			.finish()
	}
}
