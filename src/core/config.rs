/*!
 * Port Configuration
 *
 * Startup configuration for capability selection. Loaded once, from JSON or
 * from `LSM_PORT_*` environment variables, and handed to `init_port`.
 */

use super::errors::{PortError, PortResult};
use serde::{Deserialize, Serialize};

/// Environment variable selecting the checksum mode (`auto` | `portable`)
pub const ENV_CHECKSUM: &str = "LSM_PORT_CHECKSUM";

/// Environment variable enabling heap profiling (`1` | `true`)
pub const ENV_HEAP_PROFILE: &str = "LSM_PORT_HEAP_PROFILE";

/// Checksum path selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumMode {
    /// Use hardware CRC32C when the host supports it
    #[default]
    Auto,
    /// Never report acceleration; the engine uses its portable CRC32C
    Portable,
}

impl ChecksumMode {
    fn parse(value: &str) -> PortResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "portable" => Ok(Self::Portable),
            other => Err(PortError::InvalidConfig(format!(
                "{ENV_CHECKSUM}={other:?} (expected \"auto\" or \"portable\")"
            ))),
        }
    }
}

/// Port configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortConfig {
    /// Checksum path selection
    pub checksum: ChecksumMode,
    /// Report heap profiling when a profiler is registered
    pub heap_profiling: bool,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            checksum: ChecksumMode::Auto,
            heap_profiling: true,
        }
    }
}

impl PortConfig {
    /// Configuration that never reports optional capabilities
    pub const fn portable() -> Self {
        Self {
            checksum: ChecksumMode::Portable,
            heap_profiling: false,
        }
    }

    /// Parse from a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> PortResult<Self> {
        serde_json::from_str(json).map_err(|e| PortError::InvalidConfig(e.to_string()))
    }

    /// Build from `LSM_PORT_*` environment variables; unset variables take defaults
    pub fn from_env() -> PortResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> PortResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(mode) = lookup(ENV_CHECKSUM) {
            config.checksum = ChecksumMode::parse(&mode)?;
        }

        if let Some(flag) = lookup(ENV_HEAP_PROFILE) {
            config.heap_profiling = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    return Err(PortError::InvalidConfig(format!(
                        "{ENV_HEAP_PROFILE}={other:?} (expected a boolean)"
                    )))
                }
            };
        }

        Ok(config)
    }
}
