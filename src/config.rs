//! Dashboard configuration loaded from TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "BIKE_DASHBOARD_CONFIG";
/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "bike_dashboard.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataConfig {
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: f32,
    #[serde(default = "default_window_height")]
    pub height: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_export_width")]
    pub width: u32,
    #[serde(default = "default_export_height")]
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("train.csv")
}

fn default_window_width() -> f32 {
    1400.0
}

fn default_window_height() -> f32 {
    900.0
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("export")
}

fn default_export_width() -> u32 {
    900
}

fn default_export_height() -> u32 {
    600
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
            width: default_export_width(),
            height: default_export_height(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl DashboardConfig {
    /// Resolve the config file: explicit path, then `$BIKE_DASHBOARD_CONFIG`,
    /// then `./bike_dashboard.toml`. An explicit path is returned even when
    /// missing; the others only when they exist.
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .into_iter()
            .chain(std::iter::once(PathBuf::from(DEFAULT_CONFIG_FILE)))
            .find(|path| path.is_file())
    }

    /// Load the located config, or defaults when none is found. Also returns
    /// the file that was read so the caller can log it once logging is up.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match Self::locate(explicit) {
            Some(path) => {
                let config = Self::from_file(&path)?;
                Ok((config, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_uses_defaults() {
        let config = DashboardConfig::parse("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.data.path, PathBuf::from("train.csv"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.export.width, 900);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = DashboardConfig::parse(
            r#"
            [data]
            path = "/srv/bikes/train.csv"

            [export]
            height = 480
            "#,
        )
        .unwrap();
        assert_eq!(config.data.path, PathBuf::from("/srv/bikes/train.csv"));
        assert_eq!(config.export.height, 480);
        assert_eq!(config.export.width, 900);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn explicit_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"debug\"").unwrap();
        let (config, source) = DashboardConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(source.as_deref(), Some(file.path()));
    }

    #[test]
    fn explicit_path_wins_even_when_missing() {
        let path = Path::new("/no/such/bike_dashboard.toml");
        assert_eq!(DashboardConfig::locate(Some(path)), Some(path.to_path_buf()));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = DashboardConfig::load(Some(Path::new("/no/such/bike_dashboard.toml")));
        assert!(matches!(err, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[window]\nwidth = \"wide\"").unwrap();
        let err = DashboardConfig::from_file(file.path());
        assert!(matches!(err, Err(ConfigError::Parse { .. })));
    }
}
