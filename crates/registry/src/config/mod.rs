//! Declarative component configuration.
//!
//! Mixins, components, extensions and overrides can be declared in KDL. The
//! declarations carry structure only; behavior is linked by name against a
//! [`HandlerTable`] of Rust functions while parsing.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

mod handlers;

#[cfg(feature = "config-kdl")]
pub mod kdl;

#[cfg(feature = "config-kdl")]
pub mod load;


pub use handlers::{HandlerKind, HandlerTable};

use crate::context::CompositionContext;
use crate::def::{ComponentDef, MixinDef};
use crate::error::CompositionError;

/// One top-level declaration.
#[derive(Debug, Clone)]
pub enum Declaration {
	Mixin { name: String, def: MixinDef },
	Component { name: String, def: ComponentDef },
	Extension { name: String, parent: String, def: ComponentDef },
	Override { target: String, def: ComponentDef },
}

impl Declaration {
	/// The declared (or targeted) component name.
	pub fn name(&self) -> &str {
		match self {
			Self::Mixin { name, .. } | Self::Component { name, .. } | Self::Extension { name, .. } => name,
			Self::Override { target, .. } => target,
		}
	}

	pub fn kind(&self) -> &'static str {
		match self {
			Self::Mixin { .. } => "mixin",
			Self::Component { .. } => "component",
			Self::Extension { .. } => "extend",
			Self::Override { .. } => "override",
		}
	}
}

/// Parsed declarations plus the non-fatal warnings collected on the way.
#[derive(Debug, Clone, Default)]
pub struct Declarations {
	pub items: Vec<Declaration>,
	pub warnings: Vec<ConfigWarning>,
}

impl Declarations {
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Appends `other`, keeping document order.
	pub fn merge(&mut self, other: Declarations) {
		self.items.extend(other.items);
		self.warnings.extend(other.warnings);
	}

	/// Registers everything into `ctx`.
	///
	/// Mixins go first, then base components, extensions and overrides, each
	/// group in document order. Component and extension names are checked
	/// up front, so a failed apply leaves `ctx` untouched.
	pub fn apply(&self, ctx: &mut CompositionContext) -> std::result::Result<(), CompositionError> {
		self.check_names(ctx)?;
		for item in &self.items {
			if let Declaration::Mixin { name, def } = item {
				ctx.register_mixin(name, def.clone());
			}
		}
		for item in &self.items {
			if let Declaration::Component { name, def } = item {
				ctx.register_component(name, def.clone())?;
			}
		}
		for item in &self.items {
			if let Declaration::Extension { name, parent, def } = item {
				ctx.extend_component(name, parent, def.clone())?;
			}
		}
		for item in &self.items {
			if let Declaration::Override { target, def } = item {
				ctx.override_component(target, def.clone());
			}
		}
		tracing::debug!(declarations = self.items.len(), "Applied declarations");
		Ok(())
	}

	/// Rejects names taken in `ctx` or declared twice in this batch.
	fn check_names(&self, ctx: &CompositionContext) -> std::result::Result<(), CompositionError> {
		let mut claimed: FxHashMap<&str, &'static str> = FxHashMap::default();
		for item in &self.items {
			let registry = match item {
				Declaration::Component { .. } => "components",
				Declaration::Extension { .. } => "extensions",
				Declaration::Mixin { .. } | Declaration::Override { .. } => continue,
			};
			let name = item.name();
			let taken = if ctx.components().contains(name) {
				Some("components")
			} else if ctx.extensions().contains(name) {
				Some("extensions")
			} else {
				claimed.get(name).copied()
			};
			if let Some(registry) = taken {
				return Err(CompositionError::DuplicateRegistration {
					name: name.to_string(),
					registry,
				});
			}
			claimed.insert(name, registry);
		}
		Ok(())
	}
}

/// Non-fatal warning during declaration parsing.
///
/// Collected and reported, but the rest of the document still loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
	/// A top-level node that is not a declaration.
	UnknownNode {
		/// The node name.
		name: String,
	},
	/// A field inside a declaration that this kind of declaration does not accept.
	UnsupportedField {
		/// Declaration kind (e.g. "mixin").
		kind: &'static str,
		/// The declaration's name.
		name: String,
		/// The ignored field.
		field: String,
	},
}

impl std::fmt::Display for ConfigWarning {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ConfigWarning::UnknownNode { name } => write!(f, "unknown top-level node '{name}' ignored"),
			ConfigWarning::UnsupportedField { kind, name, field } => {
				write!(f, "field '{field}' is not supported in {kind} '{name}' and was ignored")
			}
		}
	}
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// Error parsing KDL syntax.
	#[cfg(feature = "config-kdl")]
	#[error("KDL parse error: {0}")]
	Kdl(#[from] ::kdl::KdlError),

	/// A declaration file could not be read.
	#[error("failed to read {}: {error}", path.display())]
	Io {
		/// The offending file.
		path: PathBuf,
		/// The underlying error.
		#[source]
		error: std::io::Error,
	},

	/// A required field is missing from the configuration.
	#[error("missing required field: {0}")]
	MissingField(String),

	/// A field has an invalid type.
	#[error("invalid type for field '{field}': expected {expected}, got {got}")]
	InvalidType {
		/// Field name.
		field: String,
		/// Expected value type.
		expected: &'static str,
		/// Actual value type.
		got: String,
	},

	/// A field holds a value outside its accepted set.
	#[error("invalid value for field '{field}': {reason}")]
	InvalidValue {
		/// Field name.
		field: String,
		/// What was wrong.
		reason: String,
	},

	/// A behavior reference names no registered handler.
	#[error("unknown {kind} handler '{name}'")]
	UnknownHandler {
		/// Which handler table was consulted.
		kind: HandlerKind,
		/// The unresolved handler name.
		name: String,
	},

	/// A template failed to parse.
	#[error("template error: {0}")]
	Template(#[from] mosaic_template::TemplateError),

	/// Registering the declarations failed.
	#[error(transparent)]
	Composition(#[from] CompositionError),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
