//! Plugins patching built-in pages through declarations.

use std::sync::Arc;

use mosaic_admin::acl::StaticAcl;
use mosaic_admin::data::InMemoryRepositoryFactory;
use mosaic_admin::notification::{Level, NOTIFIER_SERVICE, Notifier, RecordingNotifier};
use mosaic_admin::settings_search::{self, ApiContext, COMPONENT_NAME, EDITOR_PRIVILEGE};
use mosaic_admin::{handlers, register_builtins};
use mosaic_registry::{CompositionContext, Instance, parse_declarations_str};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

const PLUGIN: &str = r#"
override "sw-settings-search" {
    template "{% block sw_settings_search_smart_bar_header %}<h2>Plugin</h2>{% endblock %}"
    data { pluginFlag #false }
    methods { onSaveSearchSettings "plugin.save" }
}

extend "sw-settings-search-lite" from="sw-settings-search" {
    methods { ping "notification.info" }
}
"#;

fn services() -> mosaic_registry::Services {
	settings_search::services(
		Arc::new(InMemoryRepositoryFactory::new()),
		Arc::new(StaticAcl::new([EDITOR_PRIVILEGE])),
		Arc::new(RecordingNotifier::new()),
		ApiContext {
			language_id: "de".into(),
			system_language_id: "en".into(),
		},
	)
}

fn context() -> CompositionContext {
	let mut table = handlers();
	table.merge(mosaic_registry::HandlerTable::new().method("plugin.save", |this, args| {
		this.set("pluginFlag", json!(true));
		this.call_super(args)
	}));

	let mut ctx = CompositionContext::new();
	register_builtins(&mut ctx).unwrap();
	parse_declarations_str(PLUGIN, &table).unwrap().apply(&mut ctx).unwrap();
	ctx
}

#[test]
fn override_wraps_save_and_replaces_header_block() {
	let mut ctx = context();
	let page = ctx.materialize(COMPONENT_NAME).unwrap();

	let rendered = page.template().unwrap().render_block("sw_settings_search_smart_bar_header");
	assert_eq!(rendered.as_deref(), Some("<h2>Plugin</h2>"));
	assert!(page.template().unwrap().block("sw_settings_search_content").is_some());

	let mut instance = Instance::create(page, services()).unwrap();
	assert_eq!(instance.value("pluginFlag"), json!(false));
	instance.call("onSaveSearchSettings", &[]).unwrap();
	assert_eq!(instance.value("pluginFlag"), json!(true));
	assert_eq!(instance.value("isLoading"), json!(false));
}

#[test]
fn extension_inherits_page_and_plugin_override() {
	let mut ctx = context();
	let lite = ctx.materialize("sw-settings-search-lite").unwrap();
	assert_eq!(lite.chain(), ["sw-settings-search", "sw-settings-search-lite"].map(String::from));

	let notifier = Arc::new(RecordingNotifier::new());
	let mut services = services();
	let shared: Arc<dyn Notifier> = notifier.clone();
	services.insert(NOTIFIER_SERVICE, shared);

	let mut instance = Instance::create(lite, services).unwrap();
	instance.call("ping", &[json!({ "message": "hi" })]).unwrap();
	assert_eq!(instance.value("pluginFlag"), json!(false));

	let sent = notifier.notifications();
	assert_eq!(sent.last().map(|n| (n.level, n.message.as_str())), Some((Level::Info, "hi")));
	assert!(matches!(instance.value("productSearchConfigs"), Value::Object(_)));
}

#[test]
fn demo_declarations_compose() {
	let demo = include_str!("../../../demos/declarations/10-search-plugin.kdl");
	let mut ctx = CompositionContext::new();
	register_builtins(&mut ctx).unwrap();
	parse_declarations_str(demo, &handlers()).unwrap().apply(&mut ctx).unwrap();

	let page = ctx.materialize(COMPONENT_NAME).unwrap();
	let header = page.template().unwrap().render_block("sw_settings_search_smart_bar_header").unwrap();
	assert!(header.ends_with("<sw-label>beta</sw-label>"));
	assert!(header.contains("smart-bar-header"));

	let compact = ctx.materialize("sw-search-preview-compact").unwrap();
	assert_eq!(
		compact.template().map(|t| t.render()).as_deref(),
		Some("<div class=\"preview\"><small>{{ term }}</small></div>")
	);
	assert_eq!(compact.initial_data().get("limit"), Some(&json!(3)));
	assert!(compact.injects(NOTIFIER_SERVICE));

	let mut preview = Instance::create(compact, services()).unwrap();
	preview.set("term", json!("shoe"));
	preview.set("limit", json!(50));
	assert_eq!(preview.trigger_shortcut("ESCAPE").unwrap(), Some(Value::Null));
	assert_eq!(preview.value("term"), json!(""));
	assert_eq!(preview.value("limit"), json!(3));
}
