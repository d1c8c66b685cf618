use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core;

#[derive(Deserialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: core::Config,
}

/// Where documents and blobs live.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    File,
    Memory,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct StorageConfig {
    // Storage backend, file or memory.
    backend: Option<Backend>,
    // Root directory of the file backend.
    root_dir: Option<PathBuf>,
}

impl StorageConfig {
    const DEFAULT_BACKEND: Backend = Backend::File;
    const DEFAULT_ROOT_DIR: &'static str = ".cleanportal";

    pub fn set_backend(&mut self, val: Option<Backend>) {
        if let Some(val) = val {
            self.backend = Some(val)
        }
    }
    pub fn set_root_dir(&mut self, val: &mut Option<PathBuf>) {
        if let Some(val) = val.take() {
            self.root_dir = Some(val)
        }
    }
    pub(crate) fn override_merge(&mut self, other: &mut StorageConfig) {
        self.set_backend(other.backend);
        self.set_root_dir(&mut other.root_dir);
    }

    pub fn backend(&self) -> Backend {
        self.backend.unwrap_or(StorageConfig::DEFAULT_BACKEND)
    }

    pub fn root_dir(&self) -> &Path {
        self.root_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(StorageConfig::DEFAULT_ROOT_DIR))
    }
}

impl Config {
    pub fn override_merge(&mut self, other: &mut Config) {
        self.storage.override_merge(&mut other.storage);
        self.auth.override_merge(&mut other.auth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_yaml() {
        let yaml = r#"
storage:
  backend: memory
auth:
  privilege_collection: staff
  grant_admin_on_signup: false
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.storage.backend(), Backend::Memory);
        assert_eq!(config.storage.root_dir(), Path::new(".cleanportal"));
        assert_eq!(config.auth.privilege_collection(), "staff");
        assert!(!config.auth.grant_admin_on_signup());
        assert_eq!(config.auth.min_password_length(), 6);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.storage.backend(), Backend::File);
    }
}
