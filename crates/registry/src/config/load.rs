//! Declaration file loading.

use std::path::{Path, PathBuf};

use super::{ConfigError, ConfigWarning, Declarations, HandlerTable};

/// Aggregate result of loading a declarations directory.
#[derive(Debug, Default)]
pub struct DeclarationLoadReport {
	/// Declarations from every file that parsed, in file then document order.
	pub declarations: Declarations,
	/// Non-fatal parse warnings keyed by source file path.
	pub warnings: Vec<(PathBuf, ConfigWarning)>,
	/// File read or parse errors keyed by source file path.
	pub errors: Vec<(PathBuf, String)>,
}

impl DeclarationLoadReport {
	pub fn is_clean(&self) -> bool {
		self.warnings.is_empty() && self.errors.is_empty()
	}
}

/// Loads every `*.kdl` file directly inside `dir`, in lexical path order.
///
/// A file that fails to read or parse is recorded in `errors` and skipped;
/// the remaining files still load.
pub fn load_declarations_from_dir(dir: &Path, handlers: &HandlerTable) -> DeclarationLoadReport {
	let mut report = DeclarationLoadReport::default();

	let entries = match std::fs::read_dir(dir) {
		Ok(entries) => entries,
		Err(error) => {
			report.errors.push((dir.to_path_buf(), error.to_string()));
			return report;
		}
	};

	let mut paths: Vec<PathBuf> = entries
		.filter_map(|entry| entry.ok().map(|e| e.path()))
		.filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "kdl"))
		.collect();
	paths.sort();

	for path in paths {
		match load_declarations_file(&path, handlers) {
			Ok(mut declarations) => {
				for warning in declarations.warnings.drain(..) {
					tracing::warn!(path = %path.display(), %warning, "Declaration warning");
					report.warnings.push((path.clone(), warning));
				}
				tracing::debug!(path = %path.display(), count = declarations.len(), "Loaded declarations");
				report.declarations.merge(declarations);
			}
			Err(error) => {
				tracing::warn!(path = %path.display(), %error, "Failed to load declarations");
				report.errors.push((path, error.to_string()));
			}
		}
	}

	report
}

/// Reads and parses a single declarations file.
pub fn load_declarations_file(path: &Path, handlers: &HandlerTable) -> super::Result<Declarations> {
	let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
		path: path.to_path_buf(),
		error,
	})?;
	super::kdl::parse_declarations_str(&content, handlers)
}
