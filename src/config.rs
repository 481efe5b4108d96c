//! Configuration for asyncflow.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (ASYNCFLOW_TIME_SCALE)
//! 2. Config file (.asyncflow/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .asyncflow/config.yaml
//! - Falls back to ~/.asyncflow/config.yaml

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable overriding the time scale
pub const TIME_SCALE_ENV: &str = "ASYNCFLOW_TIME_SCALE";

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimulationConfig {
    /// Multiplier applied to every simulated duration
    pub time_scale: Option<f64>,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Multiplier applied to every simulated duration (1.0 = real time)
    pub time_scale: f64,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            config_file: None,
        }
    }
}

/// Find config file by searching current directory and parents, then home
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".asyncflow").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let home_config = dirs::home_dir()?.join(".asyncflow").join("config.yaml");
    home_config.exists().then_some(home_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse and check a time scale value
fn parse_time_scale(raw: &str) -> Result<f64> {
    let scale: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("Invalid time scale: '{}'", raw))?;
    check_time_scale(scale)
}

fn check_time_scale(scale: f64) -> Result<f64> {
    if !scale.is_finite() || scale < 0.0 {
        anyhow::bail!("Time scale must be a non-negative number, got {}", scale);
    }
    Ok(scale)
}

/// Combine the config file and the environment override
fn resolve(
    config_file: Option<(PathBuf, ConfigFile)>,
    env_scale: Option<String>,
) -> Result<ResolvedConfig> {
    let (path, file) = match config_file {
        Some((path, file)) => (Some(path), file),
        None => (None, ConfigFile::default()),
    };

    let time_scale = if let Some(raw) = env_scale {
        parse_time_scale(&raw).with_context(|| format!("Bad {} value", TIME_SCALE_ENV))?
    } else if let Some(scale) = file.simulation.time_scale {
        check_time_scale(scale)?
    } else {
        1.0
    };

    Ok(ResolvedConfig {
        time_scale,
        config_file: path,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = match find_config_file() {
        Some(path) => {
            let file = load_config_file(&path)?;
            Some((path, file))
        }
        None => None,
    };

    resolve(config_file, std::env::var(TIME_SCALE_ENV).ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_sources() {
        let config = resolve(None, None).unwrap();
        assert_eq!(config, ResolvedConfig::default());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".asyncflow");
        std::fs::create_dir_all(&dir).unwrap();

        let config_path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1"
simulation:
  time_scale: 0.25
"#
        )
        .unwrap();

        let parsed = load_config_file(&config_path).unwrap();
        assert_eq!(parsed.version.as_deref(), Some("1"));
        assert_eq!(parsed.simulation.time_scale, Some(0.25));

        let config = resolve(Some((config_path.clone(), parsed)), None).unwrap();
        assert_eq!(config.time_scale, 0.25);
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = ConfigFile {
            version: None,
            simulation: SimulationConfig {
                time_scale: Some(0.25),
            },
        };

        let config = resolve(Some((PathBuf::from("x"), file)), Some("0.5".to_string())).unwrap();
        assert_eq!(config.time_scale, 0.5);
    }

    #[test]
    fn test_invalid_time_scale() {
        assert!(resolve(None, Some("fast".to_string())).is_err());
        assert!(resolve(None, Some("-1".to_string())).is_err());

        let file = ConfigFile {
            version: None,
            simulation: SimulationConfig {
                time_scale: Some(f64::INFINITY),
            },
        };
        assert!(resolve(Some((PathBuf::from("x"), file)), None).is_err());
    }
}
