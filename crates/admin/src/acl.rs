//! Permission checks.

use rustc_hash::FxHashSet;

pub trait Acl: Send + Sync {
	fn can(&self, permission: &str) -> bool;
}

/// A fixed privilege set.
#[derive(Debug, Clone, Default)]
pub struct StaticAcl {
	privileges: FxHashSet<String>,
	admin: bool,
}

impl StaticAcl {
	pub fn new<I, S>(privileges: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			privileges: privileges.into_iter().map(Into::into).collect(),
			admin: false,
		}
	}

	/// Grants every permission.
	pub fn admin() -> Self {
		Self {
			privileges: FxHashSet::default(),
			admin: true,
		}
	}
}

impl Acl for StaticAcl {
	fn can(&self, permission: &str) -> bool {
		self.admin || self.privileges.contains(permission)
	}
}
