pub mod resolve;
pub mod template;

use std::path::Path;

use anyhow::{Context, Result};
use canvas_compare::{EngineKind, RawCompareParams};
use serde::{Deserialize, Serialize};

pub use self::resolve::{CliOverrides, ResolvedRunConfig};
pub use self::template::{config_file_exists, write_template};

pub(crate) const CONFIG_DIR: &str = ".canvas-compare";
const CONFIG_FILE: &str = "config.toml";

/// `[compare]` table: everything that shapes a single comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareConfig {
    #[serde(flatten)]
    pub params: RawCompareParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineKind>,
}

/// `[watch]` table: frame polling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,
    /// Percentage of changed pixels above which a frame counts as movement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement_gate: Option<f64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub compare: CompareConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

pub fn config_path() -> std::path::PathBuf {
    Path::new(CONFIG_DIR).join(CONFIG_FILE)
}

/// Load the config file, or defaults when there is none.
pub fn load() -> Result<Config> {
    load_from(&config_path())
}

pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}
