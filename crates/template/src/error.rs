//! Template parse errors.

/// Errors produced while parsing block-structured template markup.
///
/// Offsets are byte positions into the source string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
	/// A `{% block %}` tag was never closed by `{% endblock %}`.
	#[error("block '{name}' opened at byte {at} is never closed")]
	UnclosedBlock {
		/// Name of the unclosed block.
		name: String,
		/// Offset of the opening tag.
		at: usize,
	},

	/// `{% endblock %}` appeared with no open block.
	#[error("unexpected endblock at byte {at}")]
	UnexpectedEndBlock {
		/// Offset of the stray tag.
		at: usize,
	},

	/// `{% endblock name %}` named a different block than the one being closed.
	#[error("endblock for '{found}' at byte {at} closes block '{expected}'")]
	MismatchedEndBlock {
		/// The innermost open block.
		expected: String,
		/// The name written in the endblock tag.
		found: String,
		/// Offset of the endblock tag.
		at: usize,
	},

	/// The same block name was defined twice in one template.
	#[error("block '{name}' defined twice (second definition at byte {at})")]
	DuplicateBlock {
		/// The repeated block name.
		name: String,
		/// Offset of the second definition.
		at: usize,
	},

	/// `{% parent %}` appeared outside of any block.
	#[error("parent placeholder outside of a block at byte {at}")]
	ParentOutsideBlock {
		/// Offset of the placeholder.
		at: usize,
	},

	/// A tag was not terminated, or a block tag had no name.
	#[error("malformed tag at byte {at}: {reason}")]
	MalformedTag {
		/// Offset of the tag.
		at: usize,
		/// What was wrong with it.
		reason: &'static str,
	},
}
