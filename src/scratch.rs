use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::MigrationError;

pub const MIRRORS_DIR: &str = "repos/mirrors";

/// Local storage for the one mirror in flight, addressed by repository name.
#[derive(Debug)]
pub struct ScratchSpace {
    root: PathBuf,
    name_pattern: Regex,
}

impl ScratchSpace {
    pub fn new(workdir: &Path) -> Self {
        ScratchSpace {
            root: workdir.join(MIRRORS_DIR),
            name_pattern: Regex::new(r"^[A-Za-z0-9._-]+$").expect("static pattern"),
        }
    }

    /// Deterministic location for `name`. Names that could escape the mirrors
    /// directory are refused.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, MigrationError> {
        if name == "." || name == ".." || !self.name_pattern.is_match(name) {
            return Err(MigrationError::InvalidName(name.to_string()));
        }

        Ok(self.root.join(name))
    }

    /// Removes `path` and everything below it. A missing directory is fine.
    pub async fn clear(&self, path: &Path) -> Result<(), MigrationError> {
        match tokio::fs::remove_dir_all(path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(MigrationError::Scratch {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub async fn prepare(&self, path: &Path) -> Result<(), MigrationError> {
        self.clear(path).await?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| MigrationError::Scratch {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        Ok(())
    }
}
