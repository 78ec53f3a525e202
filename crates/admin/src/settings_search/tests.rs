use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;
use crate::acl::StaticAcl;
use crate::data::{EntityCollection, InMemoryRepositoryFactory};
use crate::notification::{Level, Notification, RecordingNotifier};
use mosaic_registry::CompositionContext;

const LANGUAGE: &str = "de-DE";
const SYSTEM_LANGUAGE: &str = "en-GB";

struct Fixture {
	ctx: CompositionContext,
	repos: Arc<InMemoryRepositoryFactory>,
	notifier: Arc<RecordingNotifier>,
	acl: Arc<dyn Acl>,
}

impl Fixture {
	fn new(acl: StaticAcl) -> Self {
		let mut ctx = CompositionContext::new();
		crate::register_builtins(&mut ctx).unwrap();
		Self {
			ctx,
			repos: Arc::new(InMemoryRepositoryFactory::new().with_associations(CONFIG_ENTITY, &["configFields"])),
			notifier: Arc::new(RecordingNotifier::new()),
			acl: Arc::new(acl),
		}
	}

	fn editor() -> Self {
		Self::new(StaticAcl::new([EDITOR_PRIVILEGE]))
	}

	fn seed_default(&self) {
		let Value::Object(config) = json!({
			"id": "default",
			"languageId": SYSTEM_LANGUAGE,
			"andLogic": false,
			"minSearchLength": 4,
			"configFields": [
				{ "id": "f1", "field": "name", "ranking": 500, "searchable": true, "tokenize": true },
				{ "id": "f2", "field": "ean", "ranking": 100, "searchable": false, "tokenize": false },
			],
		}) else {
			unreachable!()
		};
		self.repos.repository(CONFIG_ENTITY).seed(config);
	}

	fn services(&self) -> Services {
		services(
			self.repos.clone(),
			Arc::clone(&self.acl),
			self.notifier.clone(),
			ApiContext {
				language_id: LANGUAGE.into(),
				system_language_id: SYSTEM_LANGUAGE.into(),
			},
		)
	}

	fn create(&mut self) -> Instance {
		let component = self.ctx.materialize(COMPONENT_NAME).unwrap();
		Instance::create(component, self.services()).unwrap()
	}
}

#[test]
fn page_carries_the_notification_mixin() {
	let mut fx = Fixture::editor();
	let page = fx.ctx.materialize(COMPONENT_NAME).unwrap();
	assert_eq!(page.mixins(), [notification::MIXIN_NAME.to_string()]);
	assert!(page.has_method("createNotificationError"));
	assert!(page.injects(notification::NOTIFIER_SERVICE));
	assert!(page.template().unwrap().block("sw_settings_search_smart_bar_actions").is_some());
}

#[test]
fn created_loads_existing_configs() {
	let mut fx = Fixture::editor();
	fx.seed_default();
	let Value::Object(current) = json!({ "id": "current", "languageId": LANGUAGE, "andLogic": true }) else {
		unreachable!()
	};
	fx.repos.repository(CONFIG_ENTITY).seed(current);

	let page = fx.create();
	assert_eq!(page.value("productSearchConfigs")["id"], json!("current"));
	assert_eq!(page.value("defaultConfig")["id"], json!("default"));
	assert_eq!(page.value("isLoading"), json!(false));
	assert!(fx.notifier.notifications().is_empty());
}

#[test]
fn created_saves_a_default_config_when_none_exists() {
	let mut fx = Fixture::editor();
	fx.seed_default();

	let page = fx.create();
	let configs = page.value("productSearchConfigs");
	assert_eq!(configs["languageId"], json!(LANGUAGE));
	assert_eq!(configs["andLogic"], json!(false));
	assert_eq!(configs["minSearchLength"], json!(4));
	assert_eq!(configs["excludedTerms"], json!([]));

	let fields = configs["configFields"].as_array().unwrap();
	assert_eq!(fields.len(), 2);
	assert_eq!(fields[0]["field"], json!("name"));
	assert_eq!(fields[0]["searchConfigId"], configs["id"]);
	assert_eq!(fields[1]["customFieldId"], Value::Null);
	assert_ne!(fields[0]["id"], json!("f1"));

	assert_eq!(fx.repos.repository(CONFIG_ENTITY).rows().len(), 2);
}

#[test]
fn default_config_falls_back_without_system_default() {
	let mut fx = Fixture::editor();
	let page = fx.create();

	let configs = page.value("productSearchConfigs");
	assert_eq!(configs["andLogic"], json!(true));
	assert_eq!(configs["minSearchLength"], json!(2));
	assert_eq!(configs.get("configFields"), Some(&Value::Null));
}

#[test]
fn search_failure_becomes_error_notification() {
	let mut fx = Fixture::editor();
	fx.repos.repository(CONFIG_ENTITY).fail_searches(Some("connection refused"));

	let page = fx.create();
	let sent = fx.notifier.notifications();
	assert_eq!(sent.len(), 2);
	assert!(sent.iter().all(|n| n.level == Level::Error));
	assert!(sent[0].message.contains("connection refused"));
	assert_eq!(page.value("isLoading"), json!(false));
}

#[test]
fn save_reports_success_and_reloads() {
	let mut fx = Fixture::editor();
	fx.seed_default();
	let mut page = fx.create();
	fx.notifier.clear();

	page.data_mut()
		.get_mut("productSearchConfigs")
		.and_then(Value::as_object_mut)
		.unwrap()
		.insert("minSearchLength".into(), json!(7));
	page.call("onSaveSearchSettings", &[]).unwrap();

	assert_eq!(
		fx.notifier.notifications(),
		vec![Notification {
			level: Level::Success,
			message: SAVE_SUCCESS.into(),
		}]
	);
	assert_eq!(page.value("productSearchConfigs")["minSearchLength"], json!(7));
	assert_eq!(page.value("isLoading"), json!(false));
}

#[test]
fn save_failure_reports_error() {
	let mut fx = Fixture::editor();
	fx.seed_default();
	let mut page = fx.create();
	fx.notifier.clear();
	fx.repos.repository(CONFIG_ENTITY).fail_saves(Some("read-only"));

	page.call("onSaveSearchSettings", &[]).unwrap();
	assert_eq!(
		fx.notifier.notifications(),
		vec![Notification {
			level: Level::Error,
			message: SAVE_ERROR.into(),
		}]
	);
	assert_eq!(page.value("isLoading"), json!(false));
}

#[rstest]
#[case::editor(StaticAcl::new([EDITOR_PRIVILEGE]), true)]
#[case::creator(StaticAcl::new([CREATOR_PRIVILEGE]), true)]
#[case::viewer(StaticAcl::new(["product_search_config.viewer"]), false)]
#[case::admin(StaticAcl::admin(), true)]
fn allow_save_follows_acl(#[case] acl: StaticAcl, #[case] allowed: bool) {
	let mut fx = Fixture::new(acl);
	let page = fx.create();
	assert_eq!(page.computed("allowSave").unwrap(), Value::Bool(allowed));
}

#[test]
fn tooltip_reflects_permission() {
	let mut fx = Fixture::editor();
	let page = fx.create();
	assert_eq!(
		page.computed("tooltipSave").unwrap(),
		json!({ "message": "SYSTEMKEY + S", "appearance": "light" })
	);

	let mut fx = Fixture::new(StaticAcl::default());
	let page = fx.create();
	assert_eq!(
		page.computed("tooltipSave").unwrap(),
		json!({ "message": PRIVILEGE_WARNING, "disabled": false, "showOnDisabledElements": true })
	);
}

#[test]
fn save_shortcut_is_inert_without_permission() {
	let mut fx = Fixture::new(StaticAcl::default());
	fx.seed_default();
	let mut page = fx.create();
	fx.notifier.clear();

	assert_eq!(page.trigger_shortcut("SYSTEMKEY+S").unwrap(), None);
	assert!(fx.notifier.notifications().is_empty());

	assert!(page.trigger_shortcut("ESCAPE").unwrap().is_some());
}

#[test]
fn live_search_and_sales_channel_events_update_state() {
	let mut fx = Fixture::editor();
	let mut page = fx.create();

	page.call("onSalesChannelChanged", &[json!("storefront")]).unwrap();
	page.call(
		"onLiveSearchResultsChanged",
		&[json!({ "searchTerms": "shoe", "searchResults": { "total": 3 } })],
	)
	.unwrap();

	assert_eq!(page.value("currentSalesChannelId"), json!("storefront"));
	assert_eq!(page.value("searchTerms"), json!("shoe"));
	assert_eq!(page.value("searchResults"), json!({ "total": 3 }));
}

#[test]
fn missing_service_is_an_invoke_error() {
	let mut fx = Fixture::editor();
	let component = fx.ctx.materialize(COMPONENT_NAME).unwrap();
	let err = Instance::create(component, Services::new()).unwrap_err();
	assert_eq!(err, InvokeError::MissingService { name: "repositoryFactory".into() });
}

/// Accepts every save but never finds anything.
struct ForgetfulRepository;

impl Repository for ForgetfulRepository {
	fn entity_name(&self) -> &str {
		CONFIG_ENTITY
	}

	fn search(&self, _: &Criteria) -> Result<EntityCollection, DataError> {
		Ok(EntityCollection::new(CONFIG_ENTITY))
	}

	fn create(&self) -> Entity {
		let mut entity = Entity::new();
		entity.insert("id".into(), json!("fresh"));
		entity
	}

	fn save(&self, _: &Entity) -> Result<(), DataError> {
		Ok(())
	}
}

struct ForgetfulFactory;

impl RepositoryFactory for ForgetfulFactory {
	fn create(&self, _: &str) -> Arc<dyn Repository> {
		Arc::new(ForgetfulRepository)
	}
}

#[test]
fn empty_reload_after_default_save_is_reported_once() {
	let mut fx = Fixture::editor();
	let component = fx.ctx.materialize(COMPONENT_NAME).unwrap();
	let notifier = Arc::clone(&fx.notifier);
	let services = services(
		Arc::new(ForgetfulFactory),
		Arc::clone(&fx.acl),
		notifier,
		ApiContext {
			language_id: LANGUAGE.into(),
			system_language_id: SYSTEM_LANGUAGE.into(),
		},
	);

	let page = Instance::create(component, services).unwrap();
	let sent = fx.notifier.notifications();
	assert_eq!(sent.len(), 1);
	assert_eq!(sent[0].level, Level::Error);
	assert!(sent[0].message.contains(LANGUAGE));
	assert_eq!(page.value("isLoading"), json!(false));
}
