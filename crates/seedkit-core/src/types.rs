use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_FALLBACK_TYPE: &str = "text";
pub const DEFAULT_KNOWN_TYPES: &[&str] =
    &["text", "textarea", "wygwam", "playa", "matrix", "structure"];
pub const DEFAULT_OVERRIDES: &[(&str, &str)] = &[("rte", "wygwam")];
pub const DEFAULT_SETTINGS_TYPES: &[&str] = &["playa", "matrix"];
pub const DEFAULT_KNOWN_OPTIONS: &[&str] = &["status", "structure"];

/// Field types and record options the engine knows how to generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeCatalog {
    /// Field types with a generator plugin.
    pub known_types: Vec<String>,
    /// Legacy type names mapped onto a known type.
    pub overrides: BTreeMap<String, String>,
    /// Type used for fields whose declared type is unknown.
    pub fallback_type: String,
    /// Types whose configuration view needs plugin settings.
    pub settings_types: Vec<String>,
    /// Record-level options, loaded unconditionally for every run.
    pub known_options: Vec<String>,
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self {
            known_types: to_strings(DEFAULT_KNOWN_TYPES),
            overrides: DEFAULT_OVERRIDES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            fallback_type: DEFAULT_FALLBACK_TYPE.to_string(),
            settings_types: to_strings(DEFAULT_SETTINGS_TYPES),
            known_options: to_strings(DEFAULT_KNOWN_OPTIONS),
        }
    }
}

/// Effective type of a field after catalog resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedType {
    pub declared: String,
    pub name: String,
    pub is_unknown: bool,
    pub is_overridden: bool,
}

impl TypeCatalog {
    /// Check that resolution stays inside the known type set.
    ///
    /// Override targets must be known and must not themselves be overridden,
    /// which keeps resolution idempotent.
    pub fn validate(&self) -> Result<()> {
        let known: BTreeSet<&str> = self.known_types.iter().map(String::as_str).collect();
        if known.len() != self.known_types.len() {
            return Err(Error::InvalidConfig(
                "known_types contains duplicates".to_string(),
            ));
        }

        if !known.contains(self.fallback_type.as_str()) {
            return Err(Error::InvalidConfig(format!(
                "fallback type '{}' is not a known type",
                self.fallback_type
            )));
        }

        for (from, to) in &self.overrides {
            if !known.contains(to.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "override '{from}' targets unknown type '{to}'"
                )));
            }
            if self.overrides.contains_key(to) {
                return Err(Error::InvalidConfig(format!(
                    "override '{from}' targets overridden type '{to}'"
                )));
            }
        }

        for name in &self.settings_types {
            if !known.contains(name.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "settings type '{name}' is not a known type"
                )));
            }
        }

        let options: BTreeSet<&str> = self.known_options.iter().map(String::as_str).collect();
        if options.len() != self.known_options.len() {
            return Err(Error::InvalidConfig(
                "known_options contains duplicates".to_string(),
            ));
        }

        Ok(())
    }

    /// Map a declared type onto its effective type.
    pub fn resolve(&self, declared: &str) -> ResolvedType {
        if let Some(target) = self.overrides.get(declared) {
            return ResolvedType {
                declared: declared.to_string(),
                name: target.clone(),
                is_unknown: false,
                is_overridden: true,
            };
        }

        if self.is_known(declared) {
            return ResolvedType {
                declared: declared.to_string(),
                name: declared.to_string(),
                is_unknown: false,
                is_overridden: false,
            };
        }

        ResolvedType {
            declared: declared.to_string(),
            name: self.fallback_type.clone(),
            is_unknown: true,
            is_overridden: false,
        }
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.known_types.iter().any(|known| known == name)
    }

    pub fn needs_settings(&self, resolved: &str) -> bool {
        self.settings_types.iter().any(|name| name == resolved)
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
