//! Unified path management for Proven files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/proven/            # Config directory (platform default)
//! ├── config.toml              # Client configuration
//! └── session.json             # Persisted identity shared by every process
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find configuration directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for proven_core::ProvenError {
    fn from(e: PathError) -> Self {
        proven_core::ProvenError::config(e.to_string())
    }
}

const APP_DIR_NAME: &str = "proven";

/// Resolves where Proven keeps its files.
///
/// An explicit base directory replaces the platform config directory, which
/// is how tests and the `--config-dir` flag isolate state.
#[derive(Debug, Clone, Default)]
pub struct ProvenPaths {
    base_override: Option<PathBuf>,
}

impl ProvenPaths {
    pub fn new(base_override: Option<PathBuf>) -> Self {
        Self { base_override }
    }

    /// Returns the Proven configuration directory (e.g., `~/.config/proven/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_override {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn session_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("session.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_base() {
        let paths = ProvenPaths::new(Some(PathBuf::from("/tmp/proven-test")));
        assert_eq!(paths.config_dir().unwrap(), PathBuf::from("/tmp/proven-test"));
        assert_eq!(
            paths.session_file().unwrap(),
            PathBuf::from("/tmp/proven-test/session.json")
        );
        assert_eq!(
            paths.config_file().unwrap(),
            PathBuf::from("/tmp/proven-test/config.toml")
        );
    }

    #[test]
    fn test_default_ends_with_app_dir() {
        if let Ok(dir) = ProvenPaths::default().config_dir() {
            assert!(dir.ends_with(APP_DIR_NAME));
        }
    }
}
