//! The `sw-settings-search` page: product search configuration per language.
//!
//! # Role
//!
//! On creation the page loads the default configuration (system language)
//! and the configuration for the current language. When the current language
//! has none, a new one is created from the default, copying its config
//! fields, and saved. Repository failures never escape the page: they become
//! error notifications through the `notification` mixin.
//!
//! # Injected services
//!
//! | Name                | Type                         |
//! |---------------------|------------------------------|
//! | `repositoryFactory` | `Arc<dyn RepositoryFactory>` |
//! | `acl`               | `Arc<dyn Acl>`               |
//! | `context`           | [`ApiContext`]               |
//! | `notifier`          | `Arc<dyn Notifier>` (mixin)  |

#[cfg(test)]
mod tests;

use std::sync::Arc;

use mosaic_registry::{ComponentDef, Data, Instance, InvokeError, Lifecycle, Services, Shortcut, is_truthy};
use mosaic_template::{Template, TemplateError};
use serde_json::{Value, json};

use crate::acl::Acl;
use crate::data::{Criteria, DataError, Entity, Repository, RepositoryFactory};
use crate::notification::{self, Notifier};

pub const COMPONENT_NAME: &str = "sw-settings-search";

pub const CONFIG_ENTITY: &str = "product_search_config";
pub const CONFIG_FIELD_ENTITY: &str = "product_search_config_field";
pub const SALES_CHANNEL_ENTITY: &str = "sales_channel";

pub const EDITOR_PRIVILEGE: &str = "product_search_config.editor";
pub const CREATOR_PRIVILEGE: &str = "product_search_config.creator";

const SAVE_SUCCESS: &str = "sw-settings-search.notification.saveSuccess";
const SAVE_ERROR: &str = "sw-settings-search.notification.saveError";
const PRIVILEGE_WARNING: &str = "sw-privileges.tooltip.warning";
const SYSTEM_KEY: &str = "SYSTEMKEY";

const TEMPLATE: &str = include_str!("sw-settings-search.html.twig");

/// Language scope of API calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiContext {
	pub language_id: String,
	pub system_language_id: String,
}

/// Builds the service container the page expects.
pub fn services(
	repository_factory: Arc<dyn RepositoryFactory>,
	acl: Arc<dyn Acl>,
	notifier: Arc<dyn Notifier>,
	context: ApiContext,
) -> Services {
	Services::new()
		.with("repositoryFactory", repository_factory)
		.with("acl", acl)
		.with(notification::NOTIFIER_SERVICE, notifier)
		.with("context", context)
}

fn initial_data() -> Data {
	let Value::Object(data) = json!({
		"productSearchConfigs": {
			"andLogic": true,
			"minSearchLength": 2,
		},
		"isLoading": false,
		"currentSalesChannelId": null,
		"searchTerms": "",
		"searchResults": null,
		"defaultConfig": null,
		"salesChannels": null,
	}) else {
		return Data::new();
	};
	data
}

/// The page definition.
pub fn component() -> Result<ComponentDef, TemplateError> {
	Ok(ComponentDef::new()
		.template(Template::parse(TEMPLATE)?)
		.inject("repositoryFactory")
		.inject("acl")
		.inject("context")
		.mixin(notification::MIXIN_NAME)
		.shortcut(
			"SYSTEMKEY+S",
			Shortcut::new("onSaveSearchSettings").active_when(|this| this.computed("allowSave")),
		)
		.shortcut("ESCAPE", Shortcut::new("onCancel"))
		.data(initial_data)
		.hook(Lifecycle::Created, |this| this.call("createdComponent", &[]).map(drop))
		.computed("allowSave", allow_save)
		.computed("tooltipSave", tooltip_save)
		.method("createdComponent", |this, _| {
			this.call("getDefaultSearchConfig", &[])?;
			this.call("getProductSearchConfigs", &[])
		})
		.method("getProductSearchConfigs", get_product_search_configs)
		.method("getDefaultSearchConfig", get_default_search_config)
		.method("createDefaultSearchConfig", create_default_search_config)
		.method("createConfigFields", create_config_fields)
		.method("onSaveDefaultSearchConfig", on_save_default_search_config)
		.method("onChangeLanguage", |this, _| {
			this.call("getDefaultSearchConfig", &[])?;
			this.call("getProductSearchConfigs", &[])
		})
		.method("onTabChange", |this, _| this.call("getProductSearchConfigs", &[]))
		.method("onCancel", |this, _| this.call("getProductSearchConfigs", &[]))
		.method("onSaveSearchSettings", on_save_search_settings)
		.method("fetchSalesChannels", fetch_sales_channels)
		.method("onSalesChannelChanged", |this, args| {
			this.set("currentSalesChannelId", args.first().cloned().unwrap_or(Value::Null));
			Ok(Value::Null)
		})
		.method("onLiveSearchResultsChanged", |this, args| {
			let payload = args.first().cloned().unwrap_or(Value::Null);
			this.set("searchTerms", payload.get("searchTerms").cloned().unwrap_or(Value::Null));
			this.set("searchResults", payload.get("searchResults").cloned().unwrap_or(Value::Null));
			Ok(Value::Null)
		}))
}

fn repository(this: &Instance, entity: &str) -> Result<Arc<dyn Repository>, InvokeError> {
	Ok(this
		.service::<Arc<dyn RepositoryFactory>>("repositoryFactory")?
		.create(entity))
}

fn api_context(this: &Instance) -> Result<ApiContext, InvokeError> {
	this.service::<ApiContext>("context").cloned()
}

fn configs_criteria(language_id: &str) -> Criteria {
	Criteria::new()
		.add_association("configFields")
		.add_filter(Criteria::equals("languageId", language_id))
}

fn notify_error(this: &mut Instance, message: impl Into<String>) -> Result<Value, InvokeError> {
	this.call("createNotificationError", &[json!({ "message": message.into() })])
}

fn allow_save(this: &Instance) -> Result<Value, InvokeError> {
	let acl = this.service::<Arc<dyn Acl>>("acl")?;
	Ok(Value::Bool(acl.can(EDITOR_PRIVILEGE) || acl.can(CREATOR_PRIVILEGE)))
}

fn tooltip_save(this: &Instance) -> Result<Value, InvokeError> {
	let allowed = this.computed("allowSave")?;
	if allowed != Value::Bool(true) {
		return Ok(json!({
			"message": PRIVILEGE_WARNING,
			"disabled": allowed,
			"showOnDisabledElements": true,
		}));
	}
	Ok(json!({
		"message": format!("{SYSTEM_KEY} + S"),
		"appearance": "light",
	}))
}

/// Loads the config for the current language, creating a default when none
/// exists. A truthy first argument marks the reload after that default was
/// saved; an empty result then is reported instead of saving again.
fn get_product_search_configs(this: &mut Instance, args: &[Value]) -> Result<Value, InvokeError> {
	this.set("isLoading", Value::Bool(true));
	let repo = repository(this, CONFIG_ENTITY)?;
	let language_id = api_context(this)?.language_id;
	let criteria = configs_criteria(&language_id);
	let after_default_save = args.first().is_some_and(is_truthy);

	let outcome = match repo.search(&criteria) {
		Ok(items) if items.total == 0 && after_default_save => {
			notify_error(this, format!("no search configuration found for language '{language_id}'")).map(drop)
		}
		Ok(items) if items.total == 0 => this.call("onSaveDefaultSearchConfig", &[]).map(drop),
		Ok(items) => {
			let first = items.first().cloned().map_or(Value::Null, Value::Object);
			this.set("productSearchConfigs", first);
			Ok(())
		}
		Err(err) => notify_error(this, err.to_string()).map(drop),
	};

	this.set("isLoading", Value::Bool(false));
	outcome.map(|()| Value::Null)
}

fn get_default_search_config(this: &mut Instance, _: &[Value]) -> Result<Value, InvokeError> {
	let repo = repository(this, CONFIG_ENTITY)?;
	let criteria = configs_criteria(&api_context(this)?.system_language_id);

	match repo.search(&criteria) {
		Ok(items) => {
			let first = items.first().cloned().map_or(Value::Null, Value::Object);
			this.set("defaultConfig", first);
			Ok(Value::Null)
		}
		Err(err) => notify_error(this, err.to_string()),
	}
}

fn create_default_search_config(this: &mut Instance, _: &[Value]) -> Result<Value, InvokeError> {
	let repo = repository(this, CONFIG_ENTITY)?;
	let context = api_context(this)?;
	let default = this.value("defaultConfig");

	let mut config = repo.create();
	config.insert(
		"andLogic".into(),
		default.get("andLogic").cloned().unwrap_or(Value::Bool(true)),
	);
	config.insert(
		"minSearchLength".into(),
		default.get("minSearchLength").cloned().unwrap_or(json!(2)),
	);
	config.insert("excludedTerms".into(), json!([]));
	config.insert("languageId".into(), Value::String(context.language_id));
	Ok(Value::Object(config))
}

fn create_config_fields(this: &mut Instance, _: &[Value]) -> Result<Value, InvokeError> {
	let default = this.value("defaultConfig");
	let Some(fields) = default.get("configFields").and_then(Value::as_array).filter(|f| !f.is_empty()) else {
		return Ok(Value::Null);
	};

	let repo = repository(this, CONFIG_FIELD_ENTITY)?;
	let config_id = this.value("productSearchConfigs").get("id").cloned().unwrap_or(Value::Null);

	let collection: Vec<Value> = fields
		.iter()
		.map(|item| {
			let mut field: Entity = repo.create();
			for key in ["field", "ranking", "searchable", "tokenize"] {
				field.insert(key.into(), item.get(key).cloned().unwrap_or(Value::Null));
			}
			field.insert("customFieldId".into(), Value::Null);
			field.insert("searchConfigId".into(), config_id.clone());
			Value::Object(field)
		})
		.collect();
	Ok(Value::Array(collection))
}

fn on_save_default_search_config(this: &mut Instance, _: &[Value]) -> Result<Value, InvokeError> {
	let config = this.call("createDefaultSearchConfig", &[])?;
	this.set("productSearchConfigs", config);
	let fields = this.call("createConfigFields", &[])?;
	if let Some(Value::Object(config)) = this.data_mut().get_mut("productSearchConfigs") {
		config.insert("configFields".into(), fields);
	}

	match save_configs(this)? {
		Ok(()) => this.call("getProductSearchConfigs", &[Value::Bool(true)]),
		Err(err) => {
			tracing::debug!(%err, "Saving default search config failed");
			notify_error(this, SAVE_ERROR)
		}
	}
}

fn on_save_search_settings(this: &mut Instance, _: &[Value]) -> Result<Value, InvokeError> {
	this.set("isLoading", Value::Bool(true));

	let outcome = save_configs(this).and_then(|saved| match saved {
		Ok(()) => this
			.call("createNotificationSuccess", &[json!({ "message": SAVE_SUCCESS })])
			.and_then(|_| this.call("getProductSearchConfigs", &[])),
		Err(err) => {
			tracing::debug!(%err, "Saving search config failed");
			notify_error(this, SAVE_ERROR)
		}
	});

	this.set("isLoading", Value::Bool(false));
	outcome
}

/// Saves `productSearchConfigs`.
///
/// The outer error is a missing service; the inner one is the repository's.
fn save_configs(this: &Instance) -> Result<Result<(), DataError>, InvokeError> {
	let repo = repository(this, CONFIG_ENTITY)?;
	let Value::Object(config) = this.value("productSearchConfigs") else {
		return Ok(Err(DataError::Save {
			entity: CONFIG_ENTITY.into(),
			reason: "no configuration loaded".into(),
		}));
	};
	Ok(repo.save(&config))
}

fn fetch_sales_channels(this: &mut Instance, _: &[Value]) -> Result<Value, InvokeError> {
	let repo = repository(this, SALES_CHANNEL_ENTITY)?;
	match repo.search(&Criteria::new()) {
		Ok(channels) => {
			let items = channels.items.into_iter().map(Value::Object).collect();
			this.set("salesChannels", Value::Array(items));
			Ok(Value::Null)
		}
		Err(err) => notify_error(this, err.to_string()),
	}
}
