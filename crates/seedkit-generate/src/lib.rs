//! Plugin-driven record generation engine for seedkit.
//!
//! This crate resolves a schema, loads the field-type and option plugins it
//! needs, validates the raw request, and runs the generate, commit, and
//! post-save pipeline once per requested record.

pub mod engine;
pub mod errors;
pub mod model;
pub mod plugins;
pub mod resolve;
pub mod view;

pub use engine::SeedEngine;
pub use errors::SeedError;
pub use model::{SeedOptions, SeedReport};
pub use plugins::{PluginFactory, PluginRegistry};
pub use view::{FieldViewContext, OptionViewContext};
