//! End-to-end composition behavior through the public API.

use std::sync::{Arc, Mutex};

use mosaic_registry::{
	ComponentDef, CompositionContext, CompositionError, Instance, InvokeError, Lifecycle, MixinDef,
	Services,
};
use mosaic_template::Template;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn title(this: &mut Instance, _: &[Value]) -> Result<Value, InvokeError> {
	Ok(this.value("title"))
}

fn noop(_: &mut Instance, _: &[Value]) -> Result<Value, InvokeError> {
	Ok(Value::Null)
}

fn returns(value: &'static str) -> impl Fn(&mut Instance, &[Value]) -> Result<Value, InvokeError> {
	move |_, _| Ok(json!(value))
}

fn instantiate(ctx: &mut CompositionContext, name: &str) -> Instance {
	Instance::create(ctx.materialize(name).unwrap(), Services::new()).unwrap()
}

fn template(src: &str) -> Template {
	src.parse().unwrap()
}

#[test]
fn mixin_method_reads_component_data_and_sees_overrides() {
	let mut ctx = CompositionContext::new();
	ctx.register_mixin("foo", MixinDef::new().method("fooBar", title));
	ctx.register_component(
		"test",
		ComponentDef::new()
			.template(template("<div></div>"))
			.data_value(json!({ "title": "x" }))
			.mixin("foo")
			.method("bar", noop),
	)
	.unwrap();

	let component = ctx.materialize("test").unwrap();
	assert!(component.has_method("fooBar"));
	assert!(component.has_method("bar"));
	assert_eq!(instantiate(&mut ctx, "test").call("fooBar", &[]).unwrap(), json!("x"));

	ctx.override_component(
		"test",
		ComponentDef::new().data_value(json!({ "title": "y" })).method("buz", noop),
	);
	let fresh = ctx.materialize_fresh("test").unwrap();
	assert!(fresh.has_method("fooBar"));
	assert!(fresh.has_method("bar"));
	assert!(fresh.has_method("buz"));
	assert_eq!(Instance::new(fresh, Services::new()).call("fooBar", &[]).unwrap(), json!("y"));
}

#[test]
fn component_method_beats_mixin_and_survives_empty_override() {
	let mut ctx = CompositionContext::new();
	ctx.register_mixin(
		"foo-with-data",
		MixinDef::new()
			.data_value(json!({ "sortBy": null }))
			.method("fooBar", |_, _| Ok(json!("mixin"))),
	);
	ctx.register_component(
		"c",
		ComponentDef::new()
			.data_value(json!({ "sortBy": "date" }))
			.mixin("foo-with-data")
			.method("fooBar", |this, _| Ok(this.value("sortBy"))),
	)
	.unwrap();

	assert_eq!(instantiate(&mut ctx, "c").call("fooBar", &[]).unwrap(), json!("date"));

	ctx.override_component("c", ComponentDef::new());
	ctx.materialize_fresh("c").unwrap();
	assert_eq!(instantiate(&mut ctx, "c").call("fooBar", &[]).unwrap(), json!("date"));
}

#[test]
fn extension_merges_parent_and_own_mixins() {
	let mut ctx = CompositionContext::new();
	ctx.register_mixin("swFoo", MixinDef::new().method("fooBar", title));
	ctx.register_mixin(
		"swBar",
		MixinDef::new().method("biz", title).method("buz", returns("mixin")),
	);
	ctx.register_component(
		"extendable-component",
		ComponentDef::new()
			.template(template("{% block foo %}<div>aaaaa</div>{% endblock %}"))
			.data_value(json!({ "title": "testComponent" }))
			.mixin("swFoo")
			.method("bar", noop),
	)
	.unwrap();
	ctx.extend_component(
		"sw-test-component-extended",
		"extendable-component",
		ComponentDef::new()
			.template(template("{% block foo %}<div>bbbbb</div>{% endblock %}"))
			.mixin("swBar")
			.data_value(json!({ "title": "testComponentExtended" }))
			.method("buz", returns("component")),
	)
	.unwrap();

	let extended = ctx.materialize("sw-test-component-extended").unwrap();
	for method in ["fooBar", "bar", "biz", "buz"] {
		assert!(extended.has_method(method), "missing {method}");
	}
	assert_eq!(extended.mixins(), ["swFoo", "swBar"].map(String::from));
	assert_eq!(extended.template().map(Template::render).as_deref(), Some("<div>bbbbb</div>"));

	let mut instance = Instance::new(extended, Services::new());
	assert_eq!(instance.call("fooBar", &[]).unwrap(), json!("testComponentExtended"));
	assert_eq!(instance.call("buz", &[]).unwrap(), json!("component"));
}

#[test]
fn later_override_wins() {
	let mut ctx = CompositionContext::new();
	ctx.register_component("c", ComponentDef::new().method("k", returns("base")))
		.unwrap();
	ctx.override_component("c", ComponentDef::new().method("k", returns("o1")));
	ctx.override_component("c", ComponentDef::new().method("k", returns("o2")));

	assert_eq!(instantiate(&mut ctx, "c").call("k", &[]).unwrap(), json!("o2"));
}

#[test]
fn root_methods_reach_the_leaf_of_a_chain() {
	let mut ctx = CompositionContext::new();
	ctx.register_component("a", ComponentDef::new().method("onlyA", returns("a")))
		.unwrap();
	ctx.extend_component("b", "a", ComponentDef::new()).unwrap();
	ctx.extend_component("c", "b", ComponentDef::new()).unwrap();

	let c = ctx.materialize("c").unwrap();
	assert_eq!(c.chain(), ["a", "b", "c"].map(String::from));
	assert_eq!(instantiate(&mut ctx, "c").call("onlyA", &[]).unwrap(), json!("a"));
}

#[test]
fn overrides_resolve_lazily_through_extensions() {
	let mut ctx = CompositionContext::new();
	ctx.register_component("a", ComponentDef::new()).unwrap();
	ctx.extend_component("b", "a", ComponentDef::new()).unwrap();
	ctx.extend_component("c", "b", ComponentDef::new()).unwrap();
	ctx.override_component("b", ComponentDef::new().method("late", returns("from-b-override")));

	assert_eq!(instantiate(&mut ctx, "c").call("late", &[]).unwrap(), json!("from-b-override"));
}

#[test]
fn overrides_for_unregistered_targets_wait() {
	let mut ctx = CompositionContext::new();
	ctx.override_component("later", ComponentDef::new().data_value(json!({ "v": 2 })));
	assert!(ctx.materialize("later").is_err());

	ctx.register_component("later", ComponentDef::new().data_value(json!({ "v": 1 })))
		.unwrap();
	assert_eq!(instantiate(&mut ctx, "later").get("v"), Some(&json!(2)));
}

#[test]
fn child_block_replaces_only_its_counterpart() {
	let mut ctx = CompositionContext::new();
	ctx.register_component(
		"parent",
		ComponentDef::new().template(template(
			"{% block foo %}parent-foo{% endblock %}/{% block bar %}parent-bar{% endblock %}",
		)),
	)
	.unwrap();
	ctx.extend_component(
		"child",
		"parent",
		ComponentDef::new().template(template("{% block foo %}child-foo{% endblock %}")),
	)
	.unwrap();

	let child = ctx.materialize("child").unwrap();
	let merged = child.template().unwrap();
	assert_eq!(merged.render_block("foo").as_deref(), Some("child-foo"));
	assert_eq!(merged.render_block("bar").as_deref(), Some("parent-bar"));
	assert_eq!(merged.render(), "child-foo/parent-bar");
}

#[test]
fn mutual_extension_is_a_cycle() {
	let mut ctx = CompositionContext::new();
	ctx.extend_component("A", "B", ComponentDef::new()).unwrap();
	ctx.extend_component("B", "A", ComponentDef::new()).unwrap();

	match ctx.materialize("A").unwrap_err() {
		CompositionError::CyclicExtension { chain } => assert_eq!(chain, vec!["A", "B", "A"]),
		other => panic!("expected cycle, got {other:?}"),
	}
}

#[test]
fn extension_of_unknown_parent_names_the_gap() {
	let mut ctx = CompositionContext::new();
	ctx.extend_component("orphan", "nowhere", ComponentDef::new()).unwrap();
	assert_eq!(
		ctx.materialize("orphan").unwrap_err(),
		CompositionError::UnknownComponent {
			name: "nowhere".into(),
			referenced_by: Some("orphan".into()),
		}
	);
}

#[test]
fn hooks_from_every_layer_run_in_order() {
	let log = Arc::new(Mutex::new(Vec::new()));
	let record = |tag: &'static str| {
		let log = Arc::clone(&log);
		move |_: &mut Instance| -> Result<(), InvokeError> {
			log.lock().unwrap().push(tag);
			Ok(())
		}
	};

	let mut ctx = CompositionContext::new();
	ctx.register_mixin("m", MixinDef::new().hook(Lifecycle::Created, record("mixin")));
	ctx.register_component("base", ComponentDef::new().mixin("m").hook(Lifecycle::Created, record("base")))
		.unwrap();
	ctx.override_component("base", ComponentDef::new().hook(Lifecycle::Created, record("base-override")));
	ctx.extend_component("derived", "base", ComponentDef::new().hook(Lifecycle::Created, record("derived")))
		.unwrap();
	ctx.override_component(
		"derived",
		ComponentDef::new().hook(Lifecycle::Created, record("derived-override")),
	);

	instantiate(&mut ctx, "derived");
	assert_eq!(
		*log.lock().unwrap(),
		vec!["mixin", "base", "base-override", "derived", "derived-override"]
	);
}

#[test]
fn override_can_call_the_method_it_replaced() {
	let mut ctx = CompositionContext::new();
	ctx.register_component("c", ComponentDef::new().method("greet", returns("hello")))
		.unwrap();
	ctx.override_component(
		"c",
		ComponentDef::new().method("greet", |this, args| {
			let base = this.call_super(args)?;
			Ok(json!(format!("{}, world", base.as_str().unwrap_or_default())))
		}),
	);

	assert_eq!(instantiate(&mut ctx, "c").call("greet", &[]).unwrap(), json!("hello, world"));
}

#[test]
fn cached_snapshot_ignores_later_registrations() {
	let mut ctx = CompositionContext::new();
	ctx.register_mixin("m", MixinDef::new().method("v", returns("first")));
	ctx.register_component("c", ComponentDef::new().mixin("m")).unwrap();
	let before = ctx.materialize("c").unwrap();

	ctx.register_mixin("m", MixinDef::new().method("v", returns("second")));
	ctx.override_component("c", ComponentDef::new().method("extra", noop));

	let cached = ctx.materialize("c").unwrap();
	assert!(!cached.has_method("extra"));
	assert_eq!(Instance::new(cached, Services::new()).call("v", &[]).unwrap(), json!("first"));

	let fresh = ctx.materialize_fresh("c").unwrap();
	assert!(fresh.has_method("extra"));
	assert_eq!(Instance::new(fresh, Services::new()).call("v", &[]).unwrap(), json!("second"));
	assert_eq!(Instance::new(before, Services::new()).call("v", &[]).unwrap(), json!("first"));
}

#[test]
fn duplicate_component_is_rejected() {
	let mut ctx = CompositionContext::new();
	ctx.register_component("c", ComponentDef::new().method("v", returns("original")))
		.unwrap();
	assert!(matches!(
		ctx.register_component("c", ComponentDef::new()),
		Err(CompositionError::DuplicateRegistration { .. })
	));
	assert_eq!(instantiate(&mut ctx, "c").call("v", &[]).unwrap(), json!("original"));
}

#[test]
fn unknown_mixin_fails_materialization() {
	let mut ctx = CompositionContext::new();
	ctx.register_component("c", ComponentDef::new().mixin("ghost")).unwrap();
	assert_eq!(
		ctx.materialize("c").unwrap_err(),
		CompositionError::UnknownMixin {
			mixin: "ghost".into(),
			component: "c".into(),
		}
	);
}

#[test]
fn summary_describes_the_merge() {
	let mut ctx = CompositionContext::new();
	ctx.register_mixin("m", MixinDef::new().method("shared", noop));
	ctx.register_component(
		"c",
		ComponentDef::new()
			.mixin("m")
			.method("shared", noop)
			.template(template("{% block body %}{% endblock %}")),
	)
	.unwrap();

	let summary = ctx.materialize("c").unwrap().summary();
	let json = serde_json::to_value(&summary).unwrap();
	assert_eq!(json["chain"], json!(["c"]));
	assert_eq!(json["methods"][0]["origins"], json!(["mixin:m", "component:c"]));
	assert_eq!(json["template_blocks"], json!(["body"]));
}
