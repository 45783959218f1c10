//! Configuration loading
//!
//! Settings resolve in priority order:
//! 1. Environment variables (highest priority)
//! 2. TOML config file (`AGROGUARD_CONFIG` path, else `agroguard.toml` in
//!    the working directory)
//! 3. Compiled defaults (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Runtime settings for the backend service
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Directory holding the document database and the fallback store files
    pub data_dir: PathBuf,
    /// Hosted vision model credential; absent means simulator-only analysis
    pub vision_api_key: Option<String>,
    /// Force the simulator even when a credential is configured
    pub force_simulator: bool,
    pub cors_origin: String,
}

/// Subset of settings readable from the TOML file
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    host: Option<String>,
    port: Option<u16>,
    data_dir: Option<PathBuf>,
    vision_api_key: Option<String>,
    force_simulator: Option<bool>,
    cors_origin: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            vision_api_key: None,
            force_simulator: false,
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the environment and the optional config file.
    pub fn load() -> Result<Self> {
        let file = match std::env::var("AGROGUARD_CONFIG") {
            Ok(path) => Self::read_file(Path::new(&path))?,
            Err(_) => {
                let default_path = Path::new("agroguard.toml");
                if default_path.exists() {
                    Self::read_file(default_path)?
                } else {
                    FileSettings::default()
                }
            }
        };
        Ok(Self::from_sources(file, |key| std::env::var(key).ok()))
    }

    /// Parse the TOML config file.
    fn read_file(path: &Path) -> Result<FileSettings> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Merge file values with an environment lookup; environment wins.
    /// Split out from [`Settings::load`] so tests can inject both sources.
    fn from_sources(file: FileSettings, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Settings::default();

        let port = env("AGROGUARD_PORT")
            .and_then(|v| v.parse().ok())
            .or(file.port)
            .unwrap_or(defaults.port);
        let force_simulator = env("AGROGUARD_FORCE_SIMULATOR")
            .map(|v| v == "true" || v == "1")
            .or(file.force_simulator)
            .unwrap_or(defaults.force_simulator);

        Settings {
            host: env("AGROGUARD_HOST").or(file.host).unwrap_or(defaults.host),
            port,
            data_dir: env("AGROGUARD_DATA_DIR")
                .map(PathBuf::from)
                .or(file.data_dir)
                .unwrap_or(defaults.data_dir),
            vision_api_key: env("AGROGUARD_VISION_API_KEY")
                .or(file.vision_api_key)
                .filter(|k| !k.is_empty()),
            force_simulator,
            cors_origin: env("AGROGUARD_CORS_ORIGIN")
                .or(file.cors_origin)
                .unwrap_or(defaults.cors_origin),
        }
    }

    /// Path of the SQLite document database inside the data directory
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("agroguard.db")
    }

    /// Directory holding the fallback store's collection files
    pub fn fallback_dir(&self) -> PathBuf {
        self.data_dir.join("fallback")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from<'a>(map: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| map.get(key).map(|v| v.to_string())
    }

    #[test]
    fn defaults_apply_when_no_sources() {
        let settings = Settings::from_sources(FileSettings::default(), |_| None);
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.host, DEFAULT_HOST);
        assert!(settings.vision_api_key.is_none());
        assert!(!settings.force_simulator);
    }

    #[test]
    fn file_values_override_defaults() {
        let file: FileSettings =
            toml::from_str("port = 4000\nvision_api_key = \"k-123\"\nforce_simulator = true")
                .unwrap();
        let settings = Settings::from_sources(file, |_| None);
        assert_eq!(settings.port, 4000);
        assert_eq!(settings.vision_api_key.as_deref(), Some("k-123"));
        assert!(settings.force_simulator);
    }

    #[test]
    fn environment_overrides_file() {
        let file: FileSettings = toml::from_str("port = 4000\nhost = \"0.0.0.0\"").unwrap();
        let mut env = HashMap::new();
        env.insert("AGROGUARD_PORT", "5000");
        let settings = Settings::from_sources(file, env_from(&env));
        assert_eq!(settings.port, 5000);
        // untouched file value still wins over the default
        assert_eq!(settings.host, "0.0.0.0");
    }

    #[test]
    fn empty_api_key_means_unconfigured() {
        let mut env = HashMap::new();
        env.insert("AGROGUARD_VISION_API_KEY", "");
        let settings = Settings::from_sources(FileSettings::default(), env_from(&env));
        assert!(settings.vision_api_key.is_none());
    }

    #[test]
    fn derived_paths_live_under_data_dir() {
        let mut env = HashMap::new();
        env.insert("AGROGUARD_DATA_DIR", "/tmp/agro");
        let settings = Settings::from_sources(FileSettings::default(), env_from(&env));
        assert_eq!(settings.database_path(), PathBuf::from("/tmp/agro/agroguard.db"));
        assert_eq!(settings.fallback_dir(), PathBuf::from("/tmp/agro/fallback"));
    }
}
