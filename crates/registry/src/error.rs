//! Error taxonomy for registration, materialization and instance invocation.

/// Errors raised by registration or materialization.
///
/// Every variant is surfaced synchronously from the call that detects it.
/// Materialization is all-or-nothing: no partially built component is ever
/// returned alongside one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositionError {
	/// The name is neither a base component nor an extension.
	#[error("unknown component '{name}'{}", referenced_by.as_ref().map(|r| format!(" (parent of '{r}')")).unwrap_or_default())]
	UnknownComponent {
		/// The unresolved name.
		name: String,
		/// The extension whose parent pointer led here, if any.
		referenced_by: Option<String>,
	},

	/// A component, extension or override references a mixin that was never registered.
	#[error("unknown mixin '{mixin}' referenced by '{component}'")]
	UnknownMixin {
		/// The unresolved mixin name.
		mixin: String,
		/// The definition that referenced it.
		component: String,
	},

	/// Parent pointers loop back onto a name already on the chain.
	#[error("cyclic extension chain: {}", chain.join(" -> "))]
	CyclicExtension {
		/// Names walked from the requested component, ending with the repeated one.
		chain: Vec<String>,
	},

	/// The component namespace already holds this name.
	#[error("duplicate registration of '{name}' in {registry}")]
	DuplicateRegistration {
		/// The contested name.
		name: String,
		/// Which registry holds the existing definition.
		registry: &'static str,
	},
}

/// Errors raised while running behavior on a component instance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvokeError {
	#[error("unknown method '{method}'")]
	UnknownMethod { method: String },

	#[error("unknown computed property '{name}'")]
	UnknownComputed { name: String },

	/// `call_super` from the lowest implementation of a method.
	#[error("method '{method}' has no implementation beneath the current one")]
	NoSuperMethod { method: String },

	/// `call_super` while no method is executing.
	#[error("super call outside of a method")]
	SuperOutsideMethod,

	/// The component does not list the service in `inject`.
	#[error("service '{name}' is not injected into this component")]
	UnknownService { name: String },

	/// The service is injected but the caller did not provide it.
	#[error("service '{name}' was not provided")]
	MissingService { name: String },

	#[error("service '{name}' is not a {expected}")]
	ServiceType { name: String, expected: &'static str },

	/// Failure reported by user behavior.
	#[error("{0}")]
	Handler(String),
}

impl InvokeError {
	pub fn handler(msg: impl std::fmt::Display) -> Self {
		Self::Handler(msg.to_string())
	}
}

pub type Result<T, E = CompositionError> = std::result::Result<T, E>;
