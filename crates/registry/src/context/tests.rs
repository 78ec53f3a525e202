use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::{Instance, Services};

fn title_of(component: Arc<MaterializedComponent>) -> serde_json::Value {
	Instance::new(component, Services::new()).value("title")
}

#[test]
fn base_and_extension_share_a_namespace() {
	let mut ctx = CompositionContext::new();
	ctx.register_component("a", ComponentDef::new()).unwrap();
	ctx.extend_component("b", "a", ComponentDef::new()).unwrap();

	assert_eq!(
		ctx.register_component("a", ComponentDef::new()).unwrap_err(),
		CompositionError::DuplicateRegistration {
			name: "a".into(),
			registry: "components",
		}
	);
	assert_eq!(
		ctx.register_component("b", ComponentDef::new()).unwrap_err(),
		CompositionError::DuplicateRegistration {
			name: "b".into(),
			registry: "extensions",
		}
	);
	assert_eq!(
		ctx.extend_component("a", "b", ComponentDef::new()).unwrap_err(),
		CompositionError::DuplicateRegistration {
			name: "a".into(),
			registry: "components",
		}
	);
	assert_eq!(ctx.component_names(), vec!["a", "b"]);
}

#[test]
fn mixin_reregistration_replaces() {
	let mut ctx = CompositionContext::new();
	assert_eq!(ctx.register_mixin("m", MixinDef::new()), InsertAction::InsertedNew);
	assert_eq!(
		ctx.register_mixin("m", MixinDef::new().inject("acl")),
		InsertAction::ReplacedExisting
	);
	assert_eq!(ctx.mixin("m").map(|m| m.behavior.inject.clone()), Some(vec!["acl".to_string()]));
}

#[test]
fn cache_serves_snapshot_until_refreshed() {
	let mut ctx = CompositionContext::new();
	ctx.register_component("c", ComponentDef::new().data_value(json!({ "title": "x" })))
		.unwrap();

	let first = ctx.materialize("c").unwrap();
	ctx.override_component("c", ComponentDef::new().data_value(json!({ "title": "y" })));

	let cached = ctx.materialize("c").unwrap();
	assert!(Arc::ptr_eq(&first, &cached));
	assert_eq!(title_of(cached), json!("x"));

	let fresh = ctx.materialize_fresh("c").unwrap();
	assert_eq!(title_of(fresh), json!("y"));
	assert_eq!(title_of(first), json!("x"));
}

#[test]
fn invalidate_and_clear_cache() {
	let mut ctx = CompositionContext::new();
	ctx.register_component("c", ComponentDef::new()).unwrap();

	ctx.materialize("c").unwrap();
	assert!(ctx.is_cached("c"));
	assert!(ctx.invalidate("c"));
	assert!(!ctx.invalidate("c"));

	ctx.materialize("c").unwrap();
	ctx.clear_cache();
	assert!(!ctx.is_cached("c"));
}

#[test]
fn build_bypasses_the_cache() {
	let mut ctx = CompositionContext::new();
	ctx.register_component("c", ComponentDef::new()).unwrap();
	ctx.build("c").unwrap();
	assert!(!ctx.is_cached("c"));
}

#[test]
fn failed_materialization_caches_nothing() {
	let mut ctx = CompositionContext::new();
	ctx.register_component("c", ComponentDef::new().mixin("missing")).unwrap();

	assert!(ctx.materialize("c").is_err());
	assert!(!ctx.is_cached("c"));
}

#[test]
fn reset_clears_everything() {
	let mut ctx = CompositionContext::new();
	ctx.register_mixin("m", MixinDef::new());
	ctx.register_component("c", ComponentDef::new()).unwrap();
	ctx.extend_component("d", "c", ComponentDef::new()).unwrap();
	assert_eq!(ctx.override_component("c", ComponentDef::new()), 0);
	ctx.materialize("d").unwrap();

	ctx.reset();

	assert!(ctx.mixins().is_empty());
	assert!(ctx.components().is_empty());
	assert!(ctx.extensions().is_empty());
	assert!(ctx.overrides().is_empty());
	assert!(!ctx.is_cached("d"));
	assert_eq!(ctx.override_component("c", ComponentDef::new()), 0);
}
