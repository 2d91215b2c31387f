//! Environment-driven settings. Nothing here is read from a file.

use std::{
    fs,
    path::{Path, PathBuf},
};

/// Directory the archives are extracted into. Must already exist.
pub const DEST_ENV: &str = "TEMPLATEFLOW_HOME";
/// Optional JSON array replacing the built-in catalogue.
pub const MANIFEST_ENV: &str = "TEMPLATEFLOW_MANIFEST";
/// Any non-empty value hides the progress bars.
pub const NO_PROGRESS_ENV: &str = "TEMPLATEFLOW_NO_PROGRESS";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    destination: PathBuf,
    manifest: Option<String>,
    show_progress: bool,
}

impl FetchConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(DEST_ENV)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnv(DEST_ENV.to_string()))?;
        let destination = ensure_destination(Path::new(raw.trim()))?;

        let manifest = lookup(MANIFEST_ENV).filter(|v| !v.trim().is_empty());
        let show_progress = lookup(NO_PROGRESS_ENV).is_none_or(|v| v.is_empty());

        Ok(Self {
            destination,
            manifest,
            show_progress,
        })
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn manifest_override(&self) -> Option<&str> {
        self.manifest.as_deref()
    }

    pub fn show_progress(&self) -> bool {
        self.show_progress
    }
}

/// Check that `path` is an existing, writable directory. It is never created.
pub fn ensure_destination(path: &Path) -> Result<PathBuf, ConfigError> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::DestinationMissing(path.to_path_buf()));
        }
        Err(err) => return Err(ConfigError::Io(err)),
    };

    if !meta.is_dir() {
        return Err(ConfigError::NotADirectory(path.to_path_buf()));
    }
    if meta.permissions().readonly() {
        return Err(ConfigError::ReadOnly(path.to_path_buf()));
    }

    Ok(path.to_path_buf())
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("missing env var: {0}")]
    MissingEnv(String),
    #[error("destination directory does not exist: {}", .0.display())]
    DestinationMissing(PathBuf),
    #[error("destination is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("destination directory is read-only: {}", .0.display())]
    ReadOnly(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn reads_destination_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().to_str().unwrap();
        let cfg = FetchConfig::from_lookup(lookup_from(&[(DEST_ENV, dest)])).unwrap();

        assert_eq!(cfg.destination(), dir.path());
        assert!(cfg.manifest_override().is_none());
        assert!(cfg.show_progress());
    }

    #[test]
    fn reads_manifest_and_progress_toggle() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().to_str().unwrap();
        let cfg = FetchConfig::from_lookup(lookup_from(&[
            (DEST_ENV, dest),
            (MANIFEST_ENV, "[]"),
            (NO_PROGRESS_ENV, "1"),
        ]))
        .unwrap();

        assert_eq!(cfg.manifest_override(), Some("[]"));
        assert!(!cfg.show_progress());
    }

    #[test]
    fn missing_destination_env_is_an_error() {
        let err = FetchConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(ref k) if k == DEST_ENV));

        let err = FetchConfig::from_lookup(lookup_from(&[(DEST_ENV, "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(_)));
    }

    #[test]
    fn destination_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not-there");
        assert!(matches!(
            ensure_destination(&missing),
            Err(ConfigError::DestinationMissing(_))
        ));
        assert!(!missing.exists(), "destination must not be created");
    }

    #[test]
    fn destination_must_be_a_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            ensure_destination(file.path()),
            Err(ConfigError::NotADirectory(_))
        ));
    }
}
