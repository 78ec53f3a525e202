//! Block-structured templates.
//!
//! A [`Template`] is a tree of literal text and named blocks. Templates are
//! combined by block inheritance instead of whole-template replacement: a
//! derived template only contributes blocks, and each contributed block
//! replaces the same-named block of its base. Blocks the derived template does
//! not mention are inherited verbatim.
//!
//! # Markup
//!
//! ```text
//! {% block card %}
//!     <div>{% block card_title %}Title{% endblock %}</div>
//! {% endblock %}
//! ```
//!
//! Inside a replacing block, `{% parent %}` splices in the content of the block
//! being replaced:
//!
//! ```text
//! {% block card_title %}{% parent %} (extended){% endblock %}
//! ```
//!
//! # Invariants
//!
//! - Block names are unique within one template (enforced by [`Template::parse`]).
//! - [`Template::inherit`] never mutates either input; the result is a new tree.
//! - After inheritance, `{% parent %}` placeholders that had a base block to
//!   splice are gone; placeholders with nothing to splice render as empty.

mod error;
mod parse;


use rustc_hash::FxHashMap;

pub use error::TemplateError;

/// One node of a template tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
	/// Literal markup, including any non-structural tags.
	Text(String),
	/// A named, replaceable region.
	Block(Block),
	/// Placeholder for the replaced block's content.
	Parent,
}

/// A named block and its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
	pub name: String,
	pub children: Vec<Node>,
}

impl Block {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			children: Vec::new(),
		}
	}

	/// Renders the block content without its delimiters.
	pub fn render(&self) -> String {
		let mut out = String::new();
		render_nodes(&self.children, &mut out);
		out
	}
}

/// A parsed, block-structured template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
	nodes: Vec<Node>,
}

impl Template {
	/// Parses template markup.
	pub fn parse(src: &str) -> Result<Self, TemplateError> {
		Ok(Self {
			nodes: parse::parse(src)?,
		})
	}

	/// Builds a template directly from nodes.
	pub fn from_nodes(nodes: Vec<Node>) -> Self {
		Self { nodes }
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Finds a block anywhere in the tree.
	pub fn block(&self, name: &str) -> Option<&Block> {
		find_block(&self.nodes, name)
	}

	/// Returns all block names in document order.
	pub fn block_names(&self) -> Vec<&str> {
		let mut names = Vec::new();
		collect_blocks(&self.nodes, &mut |b| names.push(b.name.as_str()));
		names
	}

	/// Renders the content of one block, or `None` if the block does not exist.
	pub fn render_block(&self, name: &str) -> Option<String> {
		self.block(name).map(Block::render)
	}

	/// Renders the whole template with block delimiters removed.
	pub fn render(&self) -> String {
		let mut out = String::new();
		render_nodes(&self.nodes, &mut out);
		out
	}

	/// Layers `derived` on top of `self` by block inheritance.
	///
	/// `self` provides the skeleton. Every block of `derived` that also exists in
	/// `self` replaces it; `{% parent %}` inside a replacing block is filled with
	/// the replaced content (itself already inherited, so deeper overrides from
	/// `derived` show through). Blocks of `derived` with no counterpart in
	/// `self` are only kept if they sit inside a replacing block.
	pub fn inherit(&self, derived: &Template) -> Template {
		let mut overrides: FxHashMap<&str, &Block> = FxHashMap::default();
		collect_blocks(&derived.nodes, &mut |b| {
			overrides.insert(b.name.as_str(), b);
		});
		if overrides.is_empty() {
			return self.clone();
		}

		let mut base: FxHashMap<&str, &Block> = FxHashMap::default();
		collect_blocks(&self.nodes, &mut |b| {
			base.insert(b.name.as_str(), b);
		});

		Template {
			nodes: merge_nodes(&self.nodes, &Inherit { overrides, base }),
		}
	}
}

impl std::str::FromStr for Template {
	type Err = TemplateError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

struct Inherit<'a> {
	overrides: FxHashMap<&'a str, &'a Block>,
	base: FxHashMap<&'a str, &'a Block>,
}

fn merge_nodes(nodes: &[Node], cx: &Inherit<'_>) -> Vec<Node> {
	nodes
		.iter()
		.map(|node| match node {
			Node::Block(block) => {
				let inherited = merge_nodes(&block.children, cx);
				let children = match cx.overrides.get(block.name.as_str()) {
					Some(replacement) => splice(&replacement.children, &inherited, cx),
					None => inherited,
				};
				Node::Block(Block {
					name: block.name.clone(),
					children,
				})
			}
			other => other.clone(),
		})
		.collect()
}

/// Copies a replacing block's content, filling `{% parent %}` with `parent`.
///
/// Blocks nested inside the replacement are the derived template's own; their
/// placeholders are filled with the base's raw content for that name.
fn splice(nodes: &[Node], parent: &[Node], cx: &Inherit<'_>) -> Vec<Node> {
	let mut out = Vec::with_capacity(nodes.len());
	for node in nodes {
		match node {
			Node::Parent => out.extend(parent.iter().cloned()),
			Node::Block(nested) => {
				let nested_parent = cx
					.base
					.get(nested.name.as_str())
					.map(|b| b.children.as_slice())
					.unwrap_or(&[]);
				out.push(Node::Block(Block {
					name: nested.name.clone(),
					children: splice(&nested.children, nested_parent, cx),
				}));
			}
			Node::Text(text) => out.push(Node::Text(text.clone())),
		}
	}
	out
}

fn find_block<'a>(nodes: &'a [Node], name: &str) -> Option<&'a Block> {
	for node in nodes {
		if let Node::Block(block) = node {
			if block.name == name {
				return Some(block);
			}
			if let Some(found) = find_block(&block.children, name) {
				return Some(found);
			}
		}
	}
	None
}

fn collect_blocks<'a>(nodes: &'a [Node], f: &mut impl FnMut(&'a Block)) {
	for node in nodes {
		if let Node::Block(block) = node {
			f(block);
			collect_blocks(&block.children, f);
		}
	}
}

fn render_nodes(nodes: &[Node], out: &mut String) {
	for node in nodes {
		match node {
			Node::Text(text) => out.push_str(text),
			Node::Block(block) => render_nodes(&block.children, out),
			Node::Parent => {}
		}
	}
}
