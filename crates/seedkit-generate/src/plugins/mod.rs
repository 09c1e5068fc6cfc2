//! Field-type and option plugins.
//!
//! [`PluginFactory`] is the lookup table of every plugin the engine can
//! instantiate; [`PluginRegistry`] holds the instances loaded for one run.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use seedkit_core::{FieldOptions, FieldTypePlugin, OptionPlugin, PluginError, PluginSource};

use crate::errors::SeedError;

pub mod lorem;
pub mod matrix;
pub mod options;
pub mod relations;
pub mod text;

type FieldConstructor = Box<dyn Fn() -> Box<dyn FieldTypePlugin>>;
type OptionConstructor = Box<dyn Fn() -> Box<dyn OptionPlugin>>;

/// Constructors for every plugin the engine knows, keyed by type or option name.
pub struct PluginFactory {
    fields: BTreeMap<String, FieldConstructor>,
    options: BTreeMap<String, OptionConstructor>,
}

impl PluginFactory {
    pub fn empty() -> Self {
        Self {
            fields: BTreeMap::new(),
            options: BTreeMap::new(),
        }
    }

    /// Factory with the builtin field types and options.
    pub fn builtin() -> Self {
        let mut factory = Self::empty();
        text::register(&mut factory);
        relations::register(&mut factory);
        matrix::register(&mut factory);
        options::register(&mut factory);
        factory
    }

    /// Register (or replace) the constructor of a field-type plugin.
    pub fn register_field<F>(&mut self, type_name: &str, constructor: F)
    where
        F: Fn() -> Box<dyn FieldTypePlugin> + 'static,
    {
        self.fields
            .insert(type_name.to_string(), Box::new(constructor));
    }

    /// Register (or replace) the constructor of an option plugin.
    pub fn register_option<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn() -> Box<dyn OptionPlugin> + 'static,
    {
        self.options.insert(name.to_string(), Box::new(constructor));
    }

    pub fn field_types(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn option_names(&self) -> impl Iterator<Item = &str> {
        self.options.keys().map(String::as_str)
    }

    pub fn create_field(&self, type_name: &str) -> Option<Box<dyn FieldTypePlugin>> {
        self.fields.get(type_name).map(|constructor| constructor())
    }

    pub fn create_option(&self, name: &str) -> Option<Box<dyn OptionPlugin>> {
        self.options.get(name).map(|constructor| constructor())
    }
}

impl Default for PluginFactory {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for PluginFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginFactory")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("options", &self.options.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Plugin instances loaded for a single run.
pub struct PluginRegistry {
    fields: BTreeMap<String, Box<dyn FieldTypePlugin>>,
    options: BTreeMap<String, Box<dyn OptionPlugin>>,
}

impl PluginRegistry {
    /// Instantiate the field plugins for `field_types` and every option in
    /// `option_names`. A missing plugin is fatal.
    pub fn load(
        factory: &PluginFactory,
        field_types: &BTreeSet<String>,
        option_names: &[String],
    ) -> Result<Self, SeedError> {
        Ok(Self {
            fields: load_field_plugins(factory, field_types)?,
            options: load_option_plugins(factory, option_names)?,
        })
    }

    pub fn field_mut(&mut self, type_name: &str) -> Option<&mut (dyn FieldTypePlugin + 'static)> {
        self.fields.get_mut(type_name).map(|plugin| plugin.as_mut())
    }

    pub fn option_mut(&mut self, name: &str) -> Option<&mut (dyn OptionPlugin + 'static)> {
        self.options.get_mut(name).map(|plugin| plugin.as_mut())
    }

    pub fn field_types(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn option_names(&self) -> impl Iterator<Item = &str> {
        self.options.keys().map(String::as_str)
    }
}

impl PluginSource for PluginRegistry {
    fn field_plugin(&self, type_name: &str) -> Option<&dyn FieldTypePlugin> {
        self.fields.get(type_name).map(|plugin| plugin.as_ref())
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("options", &self.options.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Instantiate exactly the requested field-type plugins.
pub fn load_field_plugins(
    factory: &PluginFactory,
    types: &BTreeSet<String>,
) -> Result<BTreeMap<String, Box<dyn FieldTypePlugin>>, SeedError> {
    let mut plugins = BTreeMap::new();
    for type_name in types {
        let plugin = factory.create_field(type_name).ok_or_else(|| {
            SeedError::PluginLoad(format!("no field plugin registered for type '{type_name}'"))
        })?;
        if plugin.id() != type_name {
            return Err(SeedError::PluginLoad(format!(
                "plugin registered as '{type_name}' reports id '{}'",
                plugin.id()
            )));
        }
        plugins.insert(type_name.clone(), plugin);
    }
    Ok(plugins)
}

/// Instantiate the option plugins for every known option name.
pub fn load_option_plugins(
    factory: &PluginFactory,
    names: &[String],
) -> Result<BTreeMap<String, Box<dyn OptionPlugin>>, SeedError> {
    let mut plugins = BTreeMap::new();
    for name in names {
        let plugin = factory.create_option(name).ok_or_else(|| {
            SeedError::PluginLoad(format!("no option plugin registered for '{name}'"))
        })?;
        plugins.insert(name.clone(), plugin);
    }
    Ok(plugins)
}

/// Upper bound for count-like settings (words, paragraphs, rows, relations).
pub const MAX_COUNT_SETTING: u32 = 1_000;

/// Parse an optional positive integer setting, at most [`MAX_COUNT_SETTING`].
pub(crate) fn parse_positive(raw: Option<&str>, name: &str) -> Result<Option<u32>, PluginError> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    let value = raw
        .parse::<u32>()
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| {
            PluginError::InvalidConfig(format!("{name} must be a positive integer, got '{raw}'"))
        })?;
    if value > MAX_COUNT_SETTING {
        return Err(PluginError::InvalidConfig(format!(
            "{name} must be at most {MAX_COUNT_SETTING}, got {value}"
        )));
    }
    Ok(Some(value))
}

/// Count-like setting: explicit value, else the declared count, else `default`.
pub(crate) fn count_setting(
    options: &FieldOptions,
    name: &str,
    default: u32,
) -> Result<u32, PluginError> {
    Ok(parse_positive(options.setting(name), name)?
        .or(options.count)
        .unwrap_or(default))
}
