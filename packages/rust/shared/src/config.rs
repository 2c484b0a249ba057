//! Application configuration for RankScope.
//!
//! User config lives at `~/.rankscope/rankscope.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RankScopeError, Result};
use crate::query::Region;
use crate::types::{MaxPosition, SortKey};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "rankscope.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".rankscope";

// ---------------------------------------------------------------------------
// Config structs (matching rankscope.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// View and export defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Record Source selection and tuning.
    #[serde(default)]
    pub source: SourceConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Initial keyword filter (10, 20, 50 or 100).
    #[serde(default)]
    pub max_position: MaxPosition,

    /// Initial keyword sort key.
    #[serde(default)]
    pub sort: SortKey,

    /// Target region passed to the Record Source.
    #[serde(default)]
    pub region: Region,

    /// Quote CSV fields containing delimiters instead of the legacy raw output.
    #[serde(default)]
    pub quote_csv: bool,
}

/// Which Record Source implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Synthesized records (no network).
    #[default]
    Mock,
    /// Remote provider speaking the keywords / ai-visibility JSON API.
    Http,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    /// Root URL of the HTTP provider.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout for the HTTP provider.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Whether the mock source sleeps to mimic a network round trip.
    #[serde(default = "default_true")]
    pub simulate_latency: bool,

    #[serde(default = "default_keyword_latency_ms")]
    pub keyword_latency_ms: u64,

    #[serde(default = "default_ai_latency_ms")]
    pub ai_latency_ms: u64,

    /// Fixed seed for reproducible mock data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            simulate_latency: true,
            keyword_latency_ms: default_keyword_latency_ms(),
            ai_latency_ms: default_ai_latency_ms(),
            seed: None,
        }
    }
}

impl SourceConfig {
    /// Simulated latency for the keyword pipeline, if enabled.
    pub fn keyword_latency(&self) -> Duration {
        if self.simulate_latency {
            Duration::from_millis(self.keyword_latency_ms)
        } else {
            Duration::ZERO
        }
    }

    /// Simulated latency for the AI pipeline, if enabled.
    pub fn ai_latency(&self) -> Duration {
        if self.simulate_latency {
            Duration::from_millis(self.ai_latency_ms)
        } else {
            Duration::ZERO
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".into()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_true() -> bool {
    true
}
fn default_keyword_latency_ms() -> u64 {
    1500
}
fn default_ai_latency_ms() -> u64 {
    2000
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.rankscope/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RankScopeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.rankscope/rankscope.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| RankScopeError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        RankScopeError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| RankScopeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| RankScopeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| RankScopeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("max_position = 100"));
        assert!(toml_str.contains("sort = \"position\""));
        assert!(toml_str.contains("kind = \"mock\""));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.max_position, MaxPosition::Top100);
        assert_eq!(parsed.defaults.region, Region::Us);
        assert_eq!(parsed.source.keyword_latency_ms, 1500);
        assert_eq!(parsed.source.seed, None);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
max_position = 20
sort = "volume"
region = "UK"

[source]
kind = "http"
base_url = "https://ranks.internal"
seed = 7
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.max_position, MaxPosition::Top20);
        assert_eq!(config.defaults.sort, SortKey::Volume);
        assert_eq!(config.defaults.region, Region::Uk);
        assert!(!config.defaults.quote_csv);
        assert_eq!(config.source.kind, SourceKind::Http);
        assert_eq!(config.source.seed, Some(7));
        assert_eq!(config.source.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn unsupported_max_position_is_rejected() {
        let toml_str = "[defaults]\nmax_position = 25\n";
        let err = toml::from_str::<AppConfig>(toml_str).unwrap_err();
        assert!(err.to_string().contains("max position 25"));
    }

    #[test]
    fn latency_disabled_is_zero() {
        let source = SourceConfig {
            simulate_latency: false,
            ..SourceConfig::default()
        };
        assert_eq!(source.keyword_latency(), Duration::ZERO);
        assert_eq!(source.ai_latency(), Duration::ZERO);
        assert_eq!(
            SourceConfig::default().ai_latency(),
            Duration::from_millis(2000)
        );
    }

    #[test]
    fn load_config_from_reports_parse_errors() {
        let dir = std::env::temp_dir().join(format!("rankscope-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("broken.toml");
        std::fs::write(&path, "[defaults\n").expect("write");

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, RankScopeError::Config { .. }));

        let missing = load_config_from(&dir.join("missing.toml")).unwrap_err();
        assert!(matches!(missing, RankScopeError::Io { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
