//! Configuration loading and saving.

use proven_core::config::AppConfig;
use proven_core::error::Result;
use std::path::Path;

use crate::paths::ProvenPaths;
use crate::storage::AtomicTomlFile;

/// Reads and writes `config.toml`.
pub struct ConfigService {
    file: AtomicTomlFile<AppConfig>,
}

impl ConfigService {
    pub fn new(paths: &ProvenPaths) -> Result<Self> {
        Ok(Self {
            file: AtomicTomlFile::new(paths.config_file()?),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Loads the stored configuration, or defaults when there is none.
    ///
    /// Environment overrides are not applied here; see [`Self::load_effective`].
    pub fn load(&self) -> Result<AppConfig> {
        Ok(self.file.load()?.unwrap_or_default())
    }

    /// Loads the configuration with `PROVEN_*` environment overrides applied
    /// and validates the result.
    pub fn load_effective(&self) -> Result<AppConfig> {
        self.load_with(|key| std::env::var(key).ok())
    }

    pub fn load_with<F>(&self, lookup: F) -> Result<AppConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.load()?;
        config.apply_overrides(lookup)?;
        config.validate()?;
        tracing::debug!(
            api_base_url = %config.api_base_url,
            idle_timeout_secs = config.idle_timeout_secs,
            "Configuration loaded"
        );
        Ok(config)
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        config.validate()?;
        self.file.save(config)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proven_core::config::ENV_API_URL;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> ConfigService {
        ConfigService::new(&ProvenPaths::new(Some(dir.path().to_path_buf()))).unwrap()
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(service(&dir).load().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        let config = AppConfig {
            api_base_url: "https://proven.example.com/api".to_string(),
            idle_timeout_secs: 120,
            ..Default::default()
        };

        service.save(&config).unwrap();
        assert_eq!(service.load().unwrap(), config);
    }

    #[test]
    fn test_save_rejects_invalid() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig {
            idle_timeout_secs: 0,
            ..Default::default()
        };
        assert!(service(&dir).save(&config).is_err());
    }

    #[test]
    fn test_env_override_wins_over_file() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        service.save(&AppConfig::default()).unwrap();

        let config = service
            .load_with(|key| (key == ENV_API_URL).then(|| "http://localhost:8080/api".to_string()))
            .unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8080/api");
    }
}
