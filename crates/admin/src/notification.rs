//! The `notification` mixin and its notifier service.
//!
//! Components that list the mixin get `createNotification*` methods, each
//! taking one `{ "message": ... }` object and forwarding it to the injected
//! [`Notifier`].

use std::sync::Arc;

use mosaic_registry::{Instance, InvokeError, MixinDef};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

pub const MIXIN_NAME: &str = "notification";

/// Service name the mixin injects.
pub const NOTIFIER_SERVICE: &str = "notifier";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
	Success,
	Info,
	Warning,
	Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
	pub level: Level,
	pub message: String,
}

pub trait Notifier: Send + Sync {
	fn notify(&self, notification: Notification);
}

/// Keeps every notification it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
	sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn notifications(&self) -> Vec<Notification> {
		self.sent.lock().clone()
	}

	pub fn clear(&self) {
		self.sent.lock().clear();
	}
}

impl Notifier for RecordingNotifier {
	fn notify(&self, notification: Notification) {
		self.sent.lock().push(notification);
	}
}

/// Sends notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
	fn notify(&self, notification: Notification) {
		match notification.level {
			Level::Error | Level::Warning => {
				tracing::warn!(level = ?notification.level, message = %notification.message, "Notification")
			}
			Level::Success | Level::Info => {
				tracing::info!(level = ?notification.level, message = %notification.message, "Notification")
			}
		}
	}
}

pub fn notification_mixin() -> MixinDef {
	MixinDef::new()
		.inject(NOTIFIER_SERVICE)
		.method("createNotificationSuccess", |this, args| send(this, Level::Success, args))
		.method("createNotificationInfo", |this, args| send(this, Level::Info, args))
		.method("createNotificationWarning", |this, args| send(this, Level::Warning, args))
		.method("createNotificationError", |this, args| send(this, Level::Error, args))
}

pub(crate) fn send(this: &mut Instance, level: Level, args: &[Value]) -> Result<Value, InvokeError> {
	let message = args
		.first()
		.and_then(|config| config.get("message"))
		.and_then(Value::as_str)
		.ok_or_else(|| InvokeError::handler("notification expects a { message } argument"))?
		.to_string();

	let notifier = this.service::<Arc<dyn Notifier>>(NOTIFIER_SERVICE)?;
	tracing::debug!(component = this.component().name(), ?level, "Sending notification");
	notifier.notify(Notification { level, message });
	Ok(Value::Null)
}
