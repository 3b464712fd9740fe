use crate::constants;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub resolver: ResolverDefaults,
    #[serde(default)]
    pub agent_defaults: AgentDefaults,
}

/// Defaults for `openapi refs`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResolverDefaults {
    /// Maximum number of resolution passes
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,
}

const fn default_max_passes() -> usize {
    constants::DEFAULT_MAX_PASSES
}

impl Default for ResolverDefaults {
    fn default() -> Self {
        Self {
            max_passes: default_max_passes(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AgentDefaults {
    #[serde(default)]
    pub json_errors: bool,
}
