//! Component composition engine.
//!
//! Components are declared once, decorated by named mixins, patched later by
//! overrides and specialized through extension chains. Nothing is merged at
//! registration time: [`CompositionContext::materialize`] resolves a name into
//! one immutable [`MaterializedComponent`] whose behavior is the deterministic
//! merge of every contribution, regardless of the order they were registered in.
//!
//! # Modules
//!
//! - [`mixin`] - Named reusable behavior (last-write-wins)
//! - [`component`] - Base component definitions (duplicates rejected)
//! - [`overrides`] - Append-only patches per target name
//! - [`extension`] - Derived components and chain resolution
//! - [`compose`] - Layer ordering and field-wise merging
//! - [`context`] - The owning context and materialization cache
//! - [`instance`] - Runtime instances, super calls and injection
//! - [`config`] - KDL declarations linked to Rust handlers

pub mod component;
pub mod compose;
pub mod config;
pub mod context;
pub mod core;
pub mod def;
pub mod error;
pub mod extension;
pub mod instance;
pub mod materialized;
pub mod mixin;
pub mod overrides;

pub use component::ComponentRegistry;
pub use compose::{ComponentBuilder, Composer, Layer, LayerDef};
#[cfg(feature = "config-kdl")]
pub use config::kdl::parse_declarations_str;
#[cfg(feature = "config-kdl")]
pub use config::load::{DeclarationLoadReport, load_declarations_from_dir};
pub use config::{ConfigError, ConfigWarning, Declaration, Declarations, HandlerKind, HandlerTable};
pub use context::CompositionContext;
pub use core::{InsertAction, RegistryIndex};
pub use def::{
	Behavior, ComponentDef, ComputedFn, Data, DataFn, HookFn, Lifecycle, MethodFn, MixinDef, Shortcut,
};
pub use error::{CompositionError, InvokeError, Result};
pub use extension::{ChainLink, ExtensionDef, ExtensionResolver, LinkKind};
pub use instance::{Instance, Services, is_truthy};
pub use materialized::{
	ComponentSummary, ComputedEntry, DataLayer, HookEntry, LayerOrigin, MaterializedComponent,
	MethodImpl, MethodStack, MethodSummary,
};
pub use mixin::MixinRegistry;
pub use overrides::{OverrideDef, OverrideRegistry};
