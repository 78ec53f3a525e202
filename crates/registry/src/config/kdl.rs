//! KDL parsing for component declarations.
//!
//! ```kdl
//! mixin "notification" {
//!     inject "notifier"
//!     methods { createNotificationError "notification.error" }
//! }
//! component "sw-example" {
//!     template "{% block body %}{{ title }}{% endblock %}"
//!     mixins "notification"
//!     data { title "x" }
//!     hooks { created "example.created" }
//!     shortcuts { "SYSTEMKEY+S" "onSave" active="allowSave" }
//! }
//! extend "sw-example-detail" from="sw-example" { data { title "z" } }
//! override "sw-example" { data { title "y" } }
//! ```

use std::str::FromStr;
use std::sync::Arc;

use kdl::{KdlDocument, KdlNode, KdlValue};
use mosaic_template::Template;
use serde_json::Value as JsonValue;

use super::{ConfigError, ConfigWarning, Declaration, Declarations, HandlerTable, Result};
use crate::def::{ComponentDef, Data, Lifecycle, MixinDef, Shortcut};

/// Parse a KDL string into [`Declarations`], linking behavior through `handlers`.
///
/// Unknown nodes and fields become warnings; unknown handler names and
/// malformed values are errors.
pub fn parse_declarations_str(input: &str, handlers: &HandlerTable) -> Result<Declarations> {
	let doc: KdlDocument = input.parse()?;
	let mut out = Declarations::default();

	for node in doc.nodes() {
		let kind = node.name().value();
		let declaration = match kind {
			"mixin" => {
				let name = declaration_name(node, kind)?;
				let def = parse_body(node, Body::Mixin, &name, handlers, &mut out.warnings)?;
				Declaration::Mixin {
					name,
					def: MixinDef { behavior: def.behavior },
				}
			}
			"component" => {
				let name = declaration_name(node, kind)?;
				let def = parse_body(node, Body::Component, &name, handlers, &mut out.warnings)?;
				Declaration::Component { name, def }
			}
			"extend" => {
				let name = declaration_name(node, kind)?;
				let parent = match node.get("from") {
					Some(value) => expect_string(value, "from")?.to_string(),
					None => return Err(ConfigError::MissingField(format!("from (extend '{name}')"))),
				};
				let def = parse_body(node, Body::Extension, &name, handlers, &mut out.warnings)?;
				Declaration::Extension { name, parent, def }
			}
			"override" => {
				let target = declaration_name(node, kind)?;
				let def = parse_body(node, Body::Override, &target, handlers, &mut out.warnings)?;
				Declaration::Override { target, def }
			}
			other => {
				out.warnings.push(ConfigWarning::UnknownNode { name: other.to_string() });
				continue;
			}
		};
		out.items.push(declaration);
	}

	Ok(out)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Body {
	Mixin,
	Component,
	Extension,
	Override,
}

impl Body {
	fn kind(self) -> &'static str {
		match self {
			Self::Mixin => "mixin",
			Self::Component => "component",
			Self::Extension => "extend",
			Self::Override => "override",
		}
	}
}

fn parse_body(
	node: &KdlNode,
	body: Body,
	name: &str,
	handlers: &HandlerTable,
	warnings: &mut Vec<ConfigWarning>,
) -> Result<ComponentDef> {
	let mut def = ComponentDef::new();
	let Some(children) = node.children() else {
		return Ok(def);
	};

	for child in children.nodes() {
		let field = child.name().value();
		match field {
			"inject" => {
				for service in string_args(child, field)? {
					if !def.behavior.inject.contains(&service) {
						def.behavior.inject.push(service);
					}
				}
			}
			"data" => {
				let data = match child.children() {
					Some(doc) => kdl_doc_to_json(doc),
					None => Data::new(),
				};
				def.behavior.data = Some(Arc::new(move || data.clone()));
			}
			"data-fn" => {
				def.behavior.data = Some(handlers.resolve_data(&single_string(child, field)?)?);
			}
			"methods" => {
				for entry in child_nodes(child) {
					let handler = single_string(entry, "methods")?;
					def.behavior
						.methods
						.insert(entry.name().value().to_string(), handlers.resolve_method(&handler)?);
				}
			}
			"computed" => {
				for entry in child_nodes(child) {
					let handler = single_string(entry, "computed")?;
					def.behavior
						.computed
						.insert(entry.name().value().to_string(), handlers.resolve_computed(&handler)?);
				}
			}
			"hooks" => {
				for entry in child_nodes(child) {
					let stage_name = entry.name().value();
					let stage = Lifecycle::from_str(stage_name).map_err(|reason| ConfigError::InvalidValue {
						field: format!("hooks.{stage_name}"),
						reason,
					})?;
					for handler in string_args(entry, "hooks")? {
						def.behavior.hooks.push((stage, handlers.resolve_hook(&handler)?));
					}
				}
			}
			"template" | "mixins" | "shortcuts" if body == Body::Mixin => {
				warnings.push(ConfigWarning::UnsupportedField {
					kind: body.kind(),
					name: name.to_string(),
					field: field.to_string(),
				});
			}
			"template" => {
				def.template = Some(Template::parse(&single_string(child, field)?)?);
			}
			"mixins" => {
				def.mixins.extend(string_args(child, field)?);
			}
			"shortcuts" => {
				for entry in child_nodes(child) {
					let key = entry.name().value().to_string();
					let mut shortcut = Shortcut::new(single_string(entry, "shortcuts")?);
					if let Some(active) = entry.get("active") {
						let computed = expect_string(active, "shortcuts.active")?.to_string();
						shortcut = shortcut.active_when(move |this| this.computed(&computed));
					}
					def.shortcuts.insert(key, shortcut);
				}
			}
			other => {
				warnings.push(ConfigWarning::UnsupportedField {
					kind: body.kind(),
					name: name.to_string(),
					field: other.to_string(),
				});
			}
		}
	}

	Ok(def)
}

fn declaration_name(node: &KdlNode, kind: &str) -> Result<String> {
	let Some(entry) = node.entry(0) else {
		return Err(ConfigError::MissingField(format!("{kind} name")));
	};
	Ok(expect_string(entry.value(), "name")?.to_string())
}

fn child_nodes(node: &KdlNode) -> &[KdlNode] {
	node.children().map_or(&[], |doc| doc.nodes())
}

fn single_string(node: &KdlNode, field: &str) -> Result<String> {
	let Some(entry) = node.entry(0) else {
		return Err(ConfigError::MissingField(format!("{field} value for '{}'", node.name().value())));
	};
	Ok(expect_string(entry.value(), field)?.to_string())
}

/// Every positional argument of `node`, each required to be a string.
fn string_args(node: &KdlNode, field: &str) -> Result<Vec<String>> {
	node.entries()
		.iter()
		.filter(|e| e.name().is_none())
		.map(|e| expect_string(e.value(), field).map(str::to_string))
		.collect()
}

fn expect_string<'a>(value: &'a KdlValue, field: &str) -> Result<&'a str> {
	value.as_string().ok_or_else(|| ConfigError::InvalidType {
		field: field.to_string(),
		expected: "string",
		got: value_type(value).to_string(),
	})
}

fn value_type(value: &KdlValue) -> &'static str {
	if value.as_string().is_some() {
		"string"
	} else if value.as_integer().is_some() {
		"integer"
	} else if value.as_float().is_some() {
		"float"
	} else if value.as_bool().is_some() {
		"bool"
	} else {
		"null"
	}
}

/// Converts a KDL document into a JSON object.
///
/// Nodes with children become nested objects, a single argument becomes a
/// scalar, several arguments become an array, and a bare node is `true`.
pub(crate) fn kdl_doc_to_json(doc: &KdlDocument) -> Data {
	let mut map = Data::new();

	for node in doc.nodes() {
		let key = node.name().value().to_string();

		if let Some(children) = node.children() {
			map.insert(key, JsonValue::Object(kdl_doc_to_json(children)));
			continue;
		}

		let mut args: Vec<JsonValue> = node
			.entries()
			.iter()
			.filter(|e| e.name().is_none())
			.map(|e| kdl_value_to_json(e.value()))
			.collect();
		let value = match args.len() {
			0 => JsonValue::Bool(true),
			1 => args.remove(0),
			_ => JsonValue::Array(args),
		};
		map.insert(key, value);
	}

	map
}

/// Converts a KDL value to a JSON value.
fn kdl_value_to_json(value: &KdlValue) -> JsonValue {
	if let Some(s) = value.as_string() {
		JsonValue::String(s.to_string())
	} else if let Some(i) = value.as_integer() {
		match i64::try_from(i) {
			Ok(i) => JsonValue::Number(i.into()),
			Err(_) => serde_json::Number::from_f64(i as f64).map_or(JsonValue::Null, JsonValue::Number),
		}
	} else if let Some(f) = value.as_float() {
		serde_json::Number::from_f64(f).map_or(JsonValue::Null, JsonValue::Number)
	} else if let Some(b) = value.as_bool() {
		JsonValue::Bool(b)
	} else {
		JsonValue::Null
	}
}
