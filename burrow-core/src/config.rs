//! Backend configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest sniffing window accepted by [`LocalConfig::mime_sample_size`]
pub const MAX_MIME_SAMPLE: usize = 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Which backend to bind, and its settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    Local(LocalConfig),
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Local(LocalConfig::default())
    }
}

impl BackendConfig {
    pub fn root(&self) -> &Path {
        match self {
            BackendConfig::Local(local) => &local.root,
        }
    }

    pub fn set_root(&mut self, root: impl Into<PathBuf>) {
        match self {
            BackendConfig::Local(local) => local.root = root.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    pub root: PathBuf,
    /// `stat` entries through symlinks rather than `lstat` them
    pub follow_symlinks: bool,
    /// Bytes read from the head of a file for content sniffing
    pub mime_sample_size: usize,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/"),
            follow_symlinks: true,
            mime_sample_size: 8192,
        }
    }
}

impl LocalConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.backend {
            BackendConfig::Local(local) => {
                if local.root.as_os_str().is_empty() {
                    return Err(ConfigError::Invalid("backend.root must not be empty".into()));
                }
                if local.mime_sample_size == 0 || local.mime_sample_size > MAX_MIME_SAMPLE {
                    return Err(ConfigError::Invalid(format!(
                        "backend.mime_sample_size must be within 1..={MAX_MIME_SAMPLE}"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        let BackendConfig::Local(local) = &config.backend;
        assert_eq!(local.root, PathBuf::from("/"));
        assert!(local.follow_symlinks);
        assert_eq!(local.mime_sample_size, 8192);
    }

    #[test]
    fn test_parse_local() {
        let config = Config::from_toml_str(
            r#"
            [backend]
            type = "local"
            root = "/srv/files"
            follow_symlinks = false
            "#,
        )
        .unwrap();
        let BackendConfig::Local(local) = &config.backend;
        assert_eq!(local.root, PathBuf::from("/srv/files"));
        assert!(!local.follow_symlinks);
        assert_eq!(local.mime_sample_size, 8192);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.backend.root(), Path::new("/"));
    }

    #[test]
    fn test_unknown_backend_type() {
        let err = Config::from_toml_str("[backend]\ntype = \"dropbox\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_section() {
        let err = Config::from_toml_str("[cache]\nsize = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let err = Config::from_toml_str("[backend]\ntype = \"local\"\nroot = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err =
            Config::from_toml_str("[backend]\ntype = \"local\"\nmime_sample_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_set_root() {
        let mut backend = BackendConfig::default();
        backend.set_root("/tmp/x");
        assert_eq!(backend.root(), Path::new("/tmp/x"));
    }

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[backend]\ntype = \"local\"\nroot = \"/data\"\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.backend.root(), Path::new("/data"));

        let err = Config::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
