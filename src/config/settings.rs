//! Configuration settings management
//!
//! Type-safe access to global configuration settings, addressed with
//! dot-notation keys for nested values.

use crate::constants;
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Represents a valid configuration setting key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// `resolver.max_passes`
    ResolverMaxPasses,
    /// `agent_defaults.json_errors`
    AgentDefaultsJsonErrors,
}

/// Static description of a setting.
struct SettingMeta {
    table: &'static str,
    field: &'static str,
    key: &'static str,
    type_name: &'static str,
    description: &'static str,
    default: &'static str,
}

const RESOLVER_MAX_PASSES: SettingMeta = SettingMeta {
    table: "resolver",
    field: "max_passes",
    key: "resolver.max_passes",
    type_name: "integer",
    description: "Maximum passes when resolving circular references",
    default: "5",
};

const AGENT_DEFAULTS_JSON_ERRORS: SettingMeta = SettingMeta {
    table: "agent_defaults",
    field: "json_errors",
    key: "agent_defaults.json_errors",
    type_name: "boolean",
    description: "Output errors as JSON by default",
    default: "false",
};

impl SettingKey {
    /// All available setting keys for enumeration.
    pub const ALL: &'static [Self] = &[Self::ResolverMaxPasses, Self::AgentDefaultsJsonErrors];

    const fn meta(self) -> &'static SettingMeta {
        match self {
            Self::ResolverMaxPasses => &RESOLVER_MAX_PASSES,
            Self::AgentDefaultsJsonErrors => &AGENT_DEFAULTS_JSON_ERRORS,
        }
    }

    /// Returns the dot-notation key string for this setting.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.meta().key
    }

    /// The TOML table and field this key is stored under.
    #[must_use]
    pub const fn toml_path(&self) -> (&'static str, &'static str) {
        let meta = self.meta();
        (meta.table, meta.field)
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.meta().type_name
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.meta().description
    }

    #[must_use]
    pub const fn default_value_str(&self) -> &'static str {
        self.meta().default
    }

    /// Extracts the current value for this setting from a `GlobalConfig`.
    #[must_use]
    pub fn value_from_config(&self, config: &super::models::GlobalConfig) -> SettingValue {
        match self {
            Self::ResolverMaxPasses => {
                SettingValue::U64(u64::try_from(config.resolver.max_passes).unwrap_or(u64::MAX))
            }
            Self::AgentDefaultsJsonErrors => SettingValue::Bool(config.agent_defaults.json_errors),
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| Error::unknown_setting_key(s))
    }
}

/// Type-safe representation of a configuration setting value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    U64(u64),
    Bool(bool),
}

impl SettingValue {
    /// Parse a string value into the appropriate type for the given key.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be parsed as the expected type,
    /// or if the value is outside the allowed range for the setting.
    pub fn parse_for_key(key: SettingKey, value: &str) -> Result<Self, Error> {
        match key {
            SettingKey::ResolverMaxPasses => {
                let passes = value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| Error::invalid_setting_value(key, value))?;
                if !(1..=constants::MAX_PASSES_LIMIT).contains(&passes) {
                    return Err(Error::setting_value_out_of_range(
                        key,
                        value,
                        &format!("expected 1 to {}", constants::MAX_PASSES_LIMIT),
                    ));
                }
                Ok(Self::U64(passes as u64))
            }
            SettingKey::AgentDefaultsJsonErrors => parse_flag(value)
                .map(Self::Bool)
                .ok_or_else(|| Error::invalid_setting_value(key, value)),
        }
    }

    #[must_use]
    pub const fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(v) => Some(*v),
            Self::Bool(_) => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            Self::U64(_) => None,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U64(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// Information about a configuration setting for display purposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingInfo {
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub description: String,
    pub default: String,
}

impl SettingInfo {
    #[must_use]
    pub fn new(key: SettingKey, current_value: &SettingValue) -> Self {
        Self {
            key: key.as_str().to_string(),
            value: current_value.to_string(),
            type_name: key.type_name().to_string(),
            description: key.description().to_string(),
            default: key.default_value_str().to_string(),
        }
    }
}
