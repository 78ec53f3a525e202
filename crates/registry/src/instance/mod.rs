//! Runtime instances of materialized components.
//!
//! An [`Instance`] pairs a shared [`MaterializedComponent`] with its own data
//! map and injected services. Methods run against `&mut Instance`, which plays
//! the role of `this`.
//!
//! # Invariants
//!
//! - Data layers are evaluated once, in layer order, at construction.
//! - A method frame is pushed for every running implementation, so
//!   [`Instance::call_super`] always targets the implementation directly beneath
//!   the innermost running one.

mod services;


use std::any::Any;
use std::sync::Arc;

use serde_json::Value;
pub use services::Services;

use crate::def::{Data, Lifecycle};
use crate::error::InvokeError;
use crate::materialized::{MaterializedComponent, MethodStack};

#[derive(Debug, Clone)]
struct Frame {
	method: String,
	level: usize,
}

pub struct Instance {
	component: Arc<MaterializedComponent>,
	data: Data,
	services: Services,
	frames: Vec<Frame>,
}

impl Instance {
	/// Evaluates the data layers without running any hook.
	pub fn new(component: Arc<MaterializedComponent>, services: Services) -> Self {
		let data = component.initial_data();
		Self {
			component,
			data,
			services,
			frames: Vec::new(),
		}
	}

	/// Constructs the instance and runs `beforeCreate` then `created`.
	pub fn create(component: Arc<MaterializedComponent>, services: Services) -> Result<Self, InvokeError> {
		let mut instance = Self::new(component, services);
		instance.run_hook(Lifecycle::BeforeCreate)?;
		instance.run_hook(Lifecycle::Created)?;
		Ok(instance)
	}

	/// Runs `beforeMount` then `mounted`.
	pub fn mount(&mut self) -> Result<(), InvokeError> {
		self.run_hook(Lifecycle::BeforeMount)?;
		self.run_hook(Lifecycle::Mounted)
	}

	/// Runs `beforeDestroy` then `destroyed`.
	pub fn destroy(&mut self) -> Result<(), InvokeError> {
		self.run_hook(Lifecycle::BeforeDestroy)?;
		self.run_hook(Lifecycle::Destroyed)
	}

	pub fn component(&self) -> &Arc<MaterializedComponent> {
		&self.component
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.data.get(key)
	}

	/// Returns the value at `key` or `Null` when unset.
	pub fn value(&self, key: &str) -> Value {
		self.data.get(key).cloned().unwrap_or(Value::Null)
	}

	pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
		self.data.insert(key.into(), value)
	}

	pub fn data(&self) -> &Data {
		&self.data
	}

	pub fn data_mut(&mut self) -> &mut Data {
		&mut self.data
	}

	/// Runs the effective implementation of `method`.
	pub fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, InvokeError> {
		let component = Arc::clone(&self.component);
		let stack = component.method(method).ok_or_else(|| InvokeError::UnknownMethod {
			method: method.to_string(),
		})?;
		self.invoke(method, stack, stack.depth() - 1, args)
	}

	/// Runs the implementation beneath the one currently executing.
	///
	/// # Errors
	///
	/// [`InvokeError::SuperOutsideMethod`] when no method is running and
	/// [`InvokeError::NoSuperMethod`] from the lowest implementation.
	pub fn call_super(&mut self, args: &[Value]) -> Result<Value, InvokeError> {
		let Some(frame) = self.frames.last() else {
			return Err(InvokeError::SuperOutsideMethod);
		};
		if frame.level == 0 {
			return Err(InvokeError::NoSuperMethod {
				method: frame.method.clone(),
			});
		}
		let method = frame.method.clone();
		let level = frame.level - 1;

		let component = Arc::clone(&self.component);
		let stack = component.method(&method).ok_or_else(|| InvokeError::UnknownMethod {
			method: method.clone(),
		})?;
		self.invoke(&method, stack, level, args)
	}

	fn invoke(&mut self, method: &str, stack: &MethodStack, level: usize, args: &[Value]) -> Result<Value, InvokeError> {
		let Some(imp) = stack.get(level) else {
			return Err(InvokeError::UnknownMethod {
				method: method.to_string(),
			});
		};
		tracing::trace!(method, level, origin = %imp.origin, "Invoking method");

		let func = Arc::clone(&imp.func);
		self.frames.push(Frame {
			method: method.to_string(),
			level,
		});
		let result = func(self, args);
		self.frames.pop();
		result
	}

	/// Evaluates a computed property. Nothing is memoized.
	pub fn computed(&self, name: &str) -> Result<Value, InvokeError> {
		let entry = self
			.component
			.computed(name)
			.ok_or_else(|| InvokeError::UnknownComputed { name: name.to_string() })?;
		let func = Arc::clone(&entry.func);
		func(self)
	}

	/// Runs every hook for `stage` in chain order, stopping at the first error.
	pub fn run_hook(&mut self, stage: Lifecycle) -> Result<(), InvokeError> {
		let component = Arc::clone(&self.component);
		for hook in component.hooks(stage) {
			tracing::trace!(component = component.name(), %stage, origin = %hook.origin, "Running hook");
			(hook.func)(self)?;
		}
		Ok(())
	}

	/// Typed lookup of an injected service.
	pub fn service<T: Any + Send + Sync>(&self, name: &str) -> Result<&T, InvokeError> {
		if !self.component.injects(name) {
			return Err(InvokeError::UnknownService { name: name.to_string() });
		}
		let service = self
			.services
			.get(name)
			.ok_or_else(|| InvokeError::MissingService { name: name.to_string() })?;
		service.downcast_ref::<T>().ok_or_else(|| InvokeError::ServiceType {
			name: name.to_string(),
			expected: std::any::type_name::<T>(),
		})
	}

	pub fn services(&self) -> &Services {
		&self.services
	}

	/// Fires the method bound to `key`.
	///
	/// Returns `Ok(None)` when the key is unbound or its predicate is falsy.
	pub fn trigger_shortcut(&mut self, key: &str) -> Result<Option<Value>, InvokeError> {
		let component = Arc::clone(&self.component);
		let Some(shortcut) = component.shortcut(key) else {
			return Ok(None);
		};
		if let Some(active) = &shortcut.active
			&& !is_truthy(&active(self)?)
		{
			tracing::debug!(component = component.name(), key, "Shortcut inactive");
			return Ok(None);
		}
		self.call(&shortcut.method, &[]).map(Some)
	}
}

impl std::fmt::Debug for Instance {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Instance")
			.field("component", &self.component.name())
			.field("data", &self.data)
			.field("services", &self.services)
			.finish_non_exhaustive()
	}
}

/// Truthiness in the loose sense used by shortcut predicates.
pub fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
		Value::String(s) => !s.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	}
}
