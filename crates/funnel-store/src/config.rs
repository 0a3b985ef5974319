use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Environment variable overriding the storage root.
pub const ROOT_ENV_VAR: &str = "FUNNEL_DATA_DIR";

/// Storage root used when nothing else is configured, relative to the
/// working directory.
pub const DEFAULT_ROOT: &str = "funnel-data";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$FUNNEL_DATA_DIR` if set and non-empty, else [`DEFAULT_ROOT`].
    pub fn from_env() -> Self {
        Self::resolve(None, std::env::var_os(ROOT_ENV_VAR))
    }

    /// Pick the root from an explicit value, then the environment value, then
    /// the default.
    pub fn resolve(explicit: Option<PathBuf>, env: Option<OsString>) -> Self {
        let root = explicit
            .or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));
        Self { root }
    }

    /// Load a TOML file of the form `root = "..."`.
    ///
    /// A relative root is taken relative to the working directory, not the
    /// config file.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| StoreError::Setup {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&raw).map_err(|e| match e {
            StoreError::Setup { reason, .. } => StoreError::Setup {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    pub fn from_toml(raw: &str) -> StoreResult<Self> {
        toml::from_str(raw).map_err(|e| StoreError::Setup {
            path: PathBuf::new(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_root_wins() {
        let c = StoreConfig::resolve(Some("/explicit".into()), Some("/env".into()));
        assert_eq!(c.root, PathBuf::from("/explicit"));
    }

    #[test]
    fn env_root_beats_default() {
        let c = StoreConfig::resolve(None, Some("/env".into()));
        assert_eq!(c.root, PathBuf::from("/env"));
    }

    #[test]
    fn empty_env_falls_back_to_default() {
        let c = StoreConfig::resolve(None, Some(OsString::new()));
        assert_eq!(c.root, PathBuf::from(DEFAULT_ROOT));
        let c = StoreConfig::resolve(None, None);
        assert_eq!(c.root, PathBuf::from(DEFAULT_ROOT));
    }

    #[test]
    fn parses_toml() {
        let c = StoreConfig::from_toml("root = \"/var/lib/funnels\"\n").unwrap();
        assert_eq!(c.root, PathBuf::from("/var/lib/funnels"));
    }

    #[test]
    fn bad_toml_is_setup_error() {
        let err = StoreConfig::from_toml("root = 5").unwrap_err();
        assert!(matches!(err, StoreError::Setup { .. }));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        match StoreConfig::load(&path).unwrap_err() {
            StoreError::Setup { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
