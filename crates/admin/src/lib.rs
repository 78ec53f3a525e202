//! Administration leaf components built on the composition engine.
//!
//! - [`notification`] - The `notification` mixin and notifier service
//! - [`data`] - Repositories, criteria and an in-memory store
//! - [`acl`] - Permission checks
//! - [`settings_search`] - The `sw-settings-search` page

pub mod acl;
pub mod data;
pub mod notification;
pub mod settings_search;

use mosaic_registry::{CompositionContext, CompositionError, HandlerTable};
use mosaic_template::TemplateError;
use notification::Level;

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
	#[error("built-in template failed to parse: {0}")]
	Template(#[from] TemplateError),

	#[error(transparent)]
	Composition(#[from] CompositionError),
}

/// Registers the `notification` mixin and every built-in page.
pub fn register_builtins(ctx: &mut CompositionContext) -> Result<(), AdminError> {
	ctx.register_mixin(notification::MIXIN_NAME, notification::notification_mixin());
	ctx.register_component(settings_search::COMPONENT_NAME, settings_search::component()?)?;
	tracing::debug!("Registered admin built-ins");
	Ok(())
}

/// Handlers declaration files can link to.
///
/// | Name                   | Kind   |
/// |------------------------|--------|
/// | `notification.success` | method |
/// | `notification.info`    | method |
/// | `notification.warning` | method |
/// | `notification.error`   | method |
/// | `data.reset`           | method |
///
/// A component linking a `notification.*` handler must inject `notifier`.
/// `data.reset` takes no arguments and restores the initial data.
pub fn handlers() -> HandlerTable {
	HandlerTable::new()
		.method("data.reset", |this, _| {
			let initial = this.component().initial_data();
			*this.data_mut() = initial;
			Ok(serde_json::Value::Null)
		})
		.method("notification.success", |this, args| notification::send(this, Level::Success, args))
		.method("notification.info", |this, args| notification::send(this, Level::Info, args))
		.method("notification.warning", |this, args| notification::send(this, Level::Warning, args))
		.method("notification.error", |this, args| notification::send(this, Level::Error, args))
}
