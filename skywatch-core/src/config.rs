use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

/// Configuration for a single backend: the API token plus optional
/// coordinate overrides. Backends apply their own defaults when the
/// coordinates are absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub api_token: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optional default backend name, e.g. "caiyun.com".
    #[serde(default)]
    pub default_backend: Option<String>,

    /// Example TOML:
    /// [backends."caiyun.com"]
    /// api_token = "..."
    /// latitude = 30.274085
    /// longitude = 120.15507
    #[serde(default)]
    pub backends: HashMap<String, BackendConfig>,
}

impl Config {
    /// Name of the backend to use when the caller does not pick one.
    pub fn default_backend_name(&self) -> Result<&str> {
        self.default_backend.as_deref().ok_or_else(|| {
            anyhow!(
                "No default backend configured.\n\
                 Hint: run `skywatch configure <backend>` (e.g. `skywatch configure caiyun.com`) first."
            )
        })
    }

    pub fn backend_config(&self, name: &str) -> Option<&BackendConfig> {
        self.backends.get(name)
    }

    pub fn is_backend_configured(&self, name: &str) -> bool {
        self.backends.contains_key(name)
    }

    pub fn set_default_backend(&mut self, name: &str) {
        self.default_backend = Some(name.to_string());
    }

    /// Convenience helper: set/replace a backend API token and, if no default
    /// backend is set yet, make this one the default.
    pub fn upsert_backend_token(&mut self, name: &str, api_token: String) {
        let entry = self.backends.entry(name.to_string()).or_insert(BackendConfig {
            api_token: String::new(),
            latitude: None,
            longitude: None,
        });
        entry.api_token = api_token;

        if self.default_backend.is_none() {
            self.default_backend = Some(name.to_string());
        }
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skywatch", "skywatch")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backend_name_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.default_backend_name().unwrap_err();

        assert!(err.to_string().contains("No default backend configured"));
    }

    #[test]
    fn upsert_sets_token_and_default_backend() {
        let mut cfg = Config::default();

        cfg.upsert_backend_token("caiyun.com", "TOKEN".into());

        assert_eq!(cfg.default_backend_name().expect("default backend must exist"), "caiyun.com");
        assert!(cfg.is_backend_configured("caiyun.com"));
        assert_eq!(cfg.backend_config("caiyun.com").map(|c| c.api_token.as_str()), Some("TOKEN"));
    }

    #[test]
    fn upsert_does_not_override_existing_default() {
        let mut cfg = Config::default();

        cfg.upsert_backend_token("caiyun.com", "A".into());
        cfg.upsert_backend_token("other.example", "B".into());

        assert_eq!(cfg.default_backend_name().expect("default backend must exist"), "caiyun.com");
        assert!(cfg.is_backend_configured("other.example"));
    }

    #[test]
    fn upsert_keeps_existing_coordinates() {
        let mut cfg = Config::default();
        cfg.backends.insert(
            "caiyun.com".to_string(),
            BackendConfig {
                api_token: "OLD".into(),
                latitude: Some(31.0),
                longitude: Some(121.0),
            },
        );

        cfg.upsert_backend_token("caiyun.com", "NEW".into());

        let backend = cfg.backend_config("caiyun.com").expect("backend must exist");
        assert_eq!(backend.api_token, "NEW");
        assert_eq!(backend.latitude, Some(31.0));
        assert_eq!(backend.longitude, Some(121.0));
    }

    #[test]
    fn set_default_backend_overrides_default() {
        let mut cfg = Config::default();

        cfg.upsert_backend_token("caiyun.com", "A".into());
        cfg.set_default_backend("other.example");

        assert_eq!(cfg.default_backend_name().expect("default backend must exist"), "other.example");
    }

    #[test]
    fn parses_backend_table_from_toml() {
        let cfg: Config = toml::from_str(
            r#"
            default_backend = "caiyun.com"

            [backends."caiyun.com"]
            api_token = "SECRET"
            latitude = 30.274085
            longitude = 120.15507
            "#,
        )
        .expect("config TOML must parse");

        let backend = cfg.backend_config("caiyun.com").expect("backend table must exist");
        assert_eq!(backend.api_token, "SECRET");
        assert_eq!(backend.latitude, Some(30.274085));
        assert_eq!(backend.longitude, Some(120.15507));
    }

    #[test]
    fn coordinates_are_optional_in_toml() {
        let cfg: Config = toml::from_str(
            r#"
            [backends."caiyun.com"]
            api_token = "SECRET"
            "#,
        )
        .expect("config TOML must parse");

        let backend = cfg.backend_config("caiyun.com").expect("backend table must exist");
        assert_eq!(backend.latitude, None);
        assert_eq!(backend.longitude, None);
        assert!(cfg.default_backend.is_none());
    }
}
