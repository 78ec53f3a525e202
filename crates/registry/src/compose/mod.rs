//! Composer: resolves a component name into a [`MaterializedComponent`].
//!
//! # Role
//!
//! Reads the four registries and feeds their contributions to a
//! [`ComponentBuilder`] in precedence order:
//!
//! 1. The extension chain is resolved root first.
//! 2. For every link, its mixins, then the link's own definition.
//! 3. Then every override registered for that link's name, in registration
//!    order, each preceded by its own mixins.
//!
//! # Invariants
//!
//! - Building is pure: the registries are only read, and the output shares
//!   nothing mutable with them.
//! - Any failure aborts the whole build; no partial component escapes.

mod builder;


pub use builder::{ComponentBuilder, Layer, LayerDef};
use rustc_hash::FxHashSet;

use crate::component::ComponentRegistry;
use crate::def::ComponentDef;
use crate::error::{CompositionError, Result};
use crate::extension::{ExtensionResolver, LinkKind};
use crate::materialized::{LayerOrigin, MaterializedComponent};
use crate::mixin::MixinRegistry;
use crate::overrides::OverrideRegistry;

/// Borrowed view over the registries used for one build.
#[derive(Clone, Copy)]
pub struct Composer<'a> {
	pub mixins: &'a MixinRegistry,
	pub components: &'a ComponentRegistry,
	pub overrides: &'a OverrideRegistry,
	pub extensions: &'a ExtensionResolver,
}

impl<'a> Composer<'a> {
	pub fn new(
		mixins: &'a MixinRegistry,
		components: &'a ComponentRegistry,
		overrides: &'a OverrideRegistry,
		extensions: &'a ExtensionResolver,
	) -> Self {
		Self {
			mixins,
			components,
			overrides,
			extensions,
		}
	}

	pub fn build(&self, name: &str) -> Result<MaterializedComponent> {
		let chain = self.extensions.resolve_chain(name, self.components)?;
		let mut builder = ComponentBuilder::new(name);

		for link in &chain {
			let origin = match link.kind {
				LinkKind::Base => LayerOrigin::Component { name: link.name.clone() },
				LinkKind::Extension => LayerOrigin::Extension { name: link.name.clone() },
			};
			self.push_definition(&mut builder, &link.name, origin, &link.def)?;

			for ov in self.overrides.get(&link.name) {
				let origin = LayerOrigin::Override {
					target: ov.target.clone(),
					ordinal: ov.ordinal,
				};
				self.push_definition(&mut builder, &link.name, origin, &ov.patch)?;
			}
		}

		let layers = builder.layer_count();
		let component = builder.finish(chain.into_iter().map(|link| link.name).collect());
		tracing::debug!(
			component = name,
			chain = ?component.chain(),
			layers,
			"Materialized component"
		);
		Ok(component)
	}

	/// Applies `def`'s mixins followed by `def` itself.
	fn push_definition(
		&self,
		builder: &mut ComponentBuilder,
		owner: &str,
		origin: LayerOrigin,
		def: &ComponentDef,
	) -> Result<()> {
		let mut seen = FxHashSet::default();
		for mixin in &def.mixins {
			if !seen.insert(mixin.as_str()) {
				continue;
			}
			let Some(mixin_def) = self.mixins.get(mixin) else {
				return Err(CompositionError::UnknownMixin {
					mixin: mixin.clone(),
					component: owner.to_string(),
				});
			};
			builder.apply(Layer::mixin(mixin, &mixin_def));
		}
		builder.apply(Layer::component(origin, def));
		Ok(())
	}
}
