//! Markup scanner for block tags.
//!
//! Only three tags are structural: `{% block name %}`, `{% endblock [name] %}`
//! and `{% parent %}`. Every other `{% ... %}` tag and all `{{ ... }}`
//! expressions are kept verbatim as text; interpreting them is the renderer's
//! business, not ours. Whitespace-control dashes (`{%-`, `-%}`) are accepted
//! on structural tags and dropped.

use rustc_hash::FxHashSet;

use crate::error::TemplateError;
use crate::{Block, Node};

enum Tag<'a> {
	Block(&'a str),
	EndBlock(Option<&'a str>),
	Parent,
	Other,
}

fn classify(inner: &str) -> Result<Tag<'_>, &'static str> {
	let mut words = inner.split_whitespace();
	match words.next() {
		Some("block") => match words.next() {
			Some(name) if words.next().is_none() => Ok(Tag::Block(name)),
			Some(_) => Err("block tag takes exactly one name"),
			None => Err("block tag without a name"),
		},
		Some("endblock") => Ok(Tag::EndBlock(words.next())),
		Some("parent") if words.next().is_none() => Ok(Tag::Parent),
		_ => Ok(Tag::Other),
	}
}

fn container<'a>(stack: &'a mut [(Block, usize)], root: &'a mut Vec<Node>) -> &'a mut Vec<Node> {
	match stack.last_mut() {
		Some((block, _)) => &mut block.children,
		None => root,
	}
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
	if text.is_empty() {
		return;
	}
	if let Some(Node::Text(prev)) = nodes.last_mut() {
		prev.push_str(text);
	} else {
		nodes.push(Node::Text(text.to_string()));
	}
}

pub(crate) fn parse(src: &str) -> Result<Vec<Node>, TemplateError> {
	let mut root = Vec::new();
	let mut stack: Vec<(Block, usize)> = Vec::new();
	let mut seen: FxHashSet<String> = FxHashSet::default();
	let mut rest = src;
	let mut offset = 0;

	while let Some(start) = rest.find("{%") {
		push_text(container(&mut stack, &mut root), &rest[..start]);

		let at = offset + start;
		let after = &rest[start + 2..];
		let Some(end) = after.find("%}") else {
			return Err(TemplateError::MalformedTag {
				at,
				reason: "unterminated tag",
			});
		};
		let consumed = start + 2 + end + 2;
		let raw = &rest[start..consumed];
		let inner = after[..end].trim().trim_matches('-').trim();

		let tag = classify(inner).map_err(|reason| TemplateError::MalformedTag { at, reason })?;
		match tag {
			Tag::Block(name) => {
				if !seen.insert(name.to_string()) {
					return Err(TemplateError::DuplicateBlock {
						name: name.to_string(),
						at,
					});
				}
				stack.push((Block::new(name), at));
			}
			Tag::EndBlock(name) => {
				let Some((block, _)) = stack.pop() else {
					return Err(TemplateError::UnexpectedEndBlock { at });
				};
				if let Some(found) = name
					&& found != block.name
				{
					return Err(TemplateError::MismatchedEndBlock {
						expected: block.name,
						found: found.to_string(),
						at,
					});
				}
				container(&mut stack, &mut root).push(Node::Block(block));
			}
			Tag::Parent => {
				if stack.is_empty() {
					return Err(TemplateError::ParentOutsideBlock { at });
				}
				container(&mut stack, &mut root).push(Node::Parent);
			}
			Tag::Other => push_text(container(&mut stack, &mut root), raw),
		}

		rest = &rest[consumed..];
		offset += consumed;
	}

	push_text(container(&mut stack, &mut root), rest);

	if let Some((block, at)) = stack.pop() {
		return Err(TemplateError::UnclosedBlock {
			name: block.name,
			at,
		});
	}

	Ok(root)
}
