use anyhow::{Context, Result};
use bcrp_core::BcrpConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct McpConfig {
    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,

    #[serde(default)]
    pub bcrp: BcrpConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,

    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl McpConfig {
    /// Load the config file if it exists, otherwise use defaults.
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .context("Failed to read configuration file")?;
        let mut config: Self =
            toml::from_str(&content).context("Failed to parse configuration file")?;
        config.source = Some(config_path.to_path_buf());

        config
            .bcrp
            .validate()
            .context("Invalid [bcrp] configuration")?;

        Ok(config)
    }
}
