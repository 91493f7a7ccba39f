// Persisted config document: canonical location plus one-shot
// migration from the pre-bridge install location.
//
// File access is deliberately unlocked; concurrent readers and
// writers interleave with last-writer-wins semantics. Callers who
// need stronger guarantees serialize externally.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub struct ConfigStore {
    config_path: PathBuf,
    legacy_path: PathBuf,
}

impl ConfigStore {
    pub fn new(config_path: impl Into<PathBuf>, legacy_path: impl Into<PathBuf>) -> Self {
        Self { config_path: config_path.into(), legacy_path: legacy_path.into() }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Raw text of the persisted document. Any failure reads as
    /// "no config yet".
    pub fn read_raw(&self) -> Option<String> {
        fs::read_to_string(&self.config_path).ok()
    }

    /// Persist raw document text, creating parent directories.
    pub fn write_raw(&self, raw: &str) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create `{}`", parent.display()))?;
        }
        fs::write(&self.config_path, raw)
            .with_context(|| format!("failed to write `{}`", self.config_path.display()))
    }

    /// Copy the legacy file into the canonical location, once.
    /// Returns whether a copy happened; a pre-existing destination is
    /// never overwritten.
    pub fn migrate_legacy(&self) -> Result<bool> {
        if self.config_path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create `{}`", parent.display()))?;
        }
        fs::copy(&self.legacy_path, &self.config_path).with_context(|| {
            format!(
                "failed to copy `{}` to `{}`",
                self.legacy_path.display(),
                self.config_path.display()
            )
        })?;
        Ok(true)
    }
}
