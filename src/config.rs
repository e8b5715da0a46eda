use crate::errors::{BridgeError, Result};
use crate::flags::ParseFlags;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File names searched by [`BridgeConfig::discover`], in order
pub const CONFIG_FILE_NAMES: [&str; 2] = ["cindex.toml", ".cindex.toml"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub parse: ParseFlags,

    #[serde(default)]
    pub completion: CompletionConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Explicit path to the libclang shared library
    #[serde(default)]
    pub library_path: Option<String>,

    #[serde(default = "default_false")]
    pub exclude_pch: bool,

    #[serde(default = "default_false")]
    pub display_diagnostics: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Report availability and chunk kinds as engine integers
    #[serde(default = "default_false")]
    pub raw: bool,
}

fn default_false() -> bool {
    false
}

impl BridgeConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| BridgeError::Config {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BridgeError::Config {
            reason: format!("failed to parse config: {}", e),
        })
    }

    /// Find and load configuration from the current directory or its parents
    pub fn discover() -> Self {
        match std::env::current_dir() {
            Ok(dir) => Self::discover_from(&dir),
            Err(_) => Self::default(),
        }
    }

    /// Find and load configuration starting at `start`
    ///
    /// Unreadable or malformed files are skipped with a warning.
    pub fn discover_from(start: &Path) -> Self {
        for dir in start.ancestors() {
            for name in CONFIG_FILE_NAMES {
                let candidate = dir.join(name);
                if !candidate.is_file() {
                    continue;
                }
                match Self::load(&candidate) {
                    Ok(config) => {
                        tracing::debug!(path = %candidate.display(), "loaded configuration");
                        return config;
                    }
                    Err(e) => tracing::warn!(
                        path = %candidate.display(),
                        error = %e,
                        "skipping configuration"
                    ),
                }
            }
        }

        Self::default()
    }
}
