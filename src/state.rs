use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::descriptor::{contains_name, RepositoryDescriptor};
use crate::error::StateError;

pub const STATE_DIR: &str = "repos";

#[derive(Clone, Debug, PartialEq)]
pub struct StatePaths {
    pub batch: PathBuf,
    pub pending: PathBuf,
    pub done: PathBuf,
    pub failed: PathBuf,
}

impl StatePaths {
    pub fn new(workdir: &Path) -> Self {
        let state_dir = workdir.join(STATE_DIR);

        StatePaths {
            batch: state_dir.join("repos.json"),
            pending: state_dir.join("unmigrated.json"),
            done: state_dir.join("migrated.json"),
            failed: state_dir.join("failed.json"),
        }
    }
}

/// The three partitions of the batch as held in memory by the driver.
#[derive(Debug, Default, PartialEq)]
pub struct MigrationState {
    pub pending: VecDeque<RepositoryDescriptor>,
    pub done: Vec<RepositoryDescriptor>,
    pub failed: Vec<RepositoryDescriptor>,
}

impl MigrationState {
    /// Removes the head of Pending. Strict FIFO so a resumed run picks up
    /// where the previous one stopped.
    pub fn take_next(&mut self) -> Option<RepositoryDescriptor> {
        self.pending.pop_front()
    }

    pub fn record_done(&mut self, repository: RepositoryDescriptor) -> bool {
        append_unique(&mut self.done, repository)
    }

    pub fn record_failed(&mut self, repository: RepositoryDescriptor) -> bool {
        append_unique(&mut self.failed, repository)
    }
}

fn append_unique(
    repositories: &mut Vec<RepositoryDescriptor>,
    repository: RepositoryDescriptor,
) -> bool {
    if contains_name(repositories, &repository.name) {
        return false;
    }
    repositories.push(repository);
    true
}

/// Durable Pending/Done/Failed partitions, one pretty-printed JSON file each,
/// next to the read-only batch file.
#[derive(Clone, Debug)]
pub struct MigrationStateStore {
    paths: StatePaths,
}

impl MigrationStateStore {
    pub fn new(workdir: &Path) -> Self {
        MigrationStateStore {
            paths: StatePaths::new(workdir),
        }
    }

    pub fn paths(&self) -> &StatePaths {
        &self.paths
    }

    /// Written by the enumeration step only.
    pub async fn write_batch(&self, batch: &[RepositoryDescriptor]) -> Result<()> {
        write_json(&self.paths.batch, &batch).await
    }

    pub async fn load(&self) -> Result<MigrationState> {
        let batch: Vec<RepositoryDescriptor> = read_json(&self.paths.batch)
            .await?
            .ok_or_else(|| StateError::BatchMissing(self.paths.batch.clone()))?;
        ensure_unique_names(&batch).map_err(StateError::DuplicateName)?;

        let mut pending: VecDeque<RepositoryDescriptor> =
            match read_json(&self.paths.pending).await? {
                Some(pending) => pending,
                None => {
                    info!(count = batch.len(), "seeding pending list from batch");
                    let pending: VecDeque<_> = batch.into_iter().collect();
                    self.persist_pending(&pending).await?;
                    pending
                }
            };

        let done = self.load_or_seed_empty(&self.paths.done).await?;
        let failed = self.load_or_seed_empty(&self.paths.failed).await?;

        ensure_unique_names(&pending).map_err(duplicate_entry(&self.paths.pending))?;
        ensure_unique_names(&done).map_err(duplicate_entry(&self.paths.done))?;
        ensure_unique_names(&failed).map_err(duplicate_entry(&self.paths.failed))?;
        if let Some(repository) = done
            .iter()
            .find(|repository| contains_name(&failed, &repository.name))
        {
            return Err(StateError::RecordedTwice(repository.name.clone()).into());
        }

        let before = pending.len();
        pending.retain(|repository| {
            let recorded = contains_name(&done, &repository.name)
                || contains_name(&failed, &repository.name);
            if recorded {
                warn!(
                    repository = %repository.name,
                    "dropping pending entry that is already recorded"
                );
            }
            !recorded
        });
        if pending.len() != before {
            self.persist_pending(&pending).await?;
        }

        Ok(MigrationState {
            pending,
            done,
            failed,
        })
    }

    pub async fn persist_pending(&self, pending: &VecDeque<RepositoryDescriptor>) -> Result<()> {
        write_json(&self.paths.pending, pending).await
    }

    pub async fn persist_done(&self, done: &[RepositoryDescriptor]) -> Result<()> {
        write_json(&self.paths.done, &done).await
    }

    pub async fn persist_failed(&self, failed: &[RepositoryDescriptor]) -> Result<()> {
        write_json(&self.paths.failed, &failed).await
    }

    async fn load_or_seed_empty(&self, path: &Path) -> Result<Vec<RepositoryDescriptor>> {
        match read_json(path).await? {
            Some(repositories) => Ok(repositories),
            None => {
                let empty: Vec<RepositoryDescriptor> = Vec::new();
                write_json(path, &empty).await?;
                Ok(empty)
            }
        }
    }
}

/// Returns the first name seen twice.
fn ensure_unique_names<'a>(
    repositories: impl IntoIterator<Item = &'a RepositoryDescriptor>,
) -> Result<(), String> {
    let mut seen = HashSet::new();
    for repository in repositories {
        if !seen.insert(repository.name.as_str()) {
            return Err(repository.name.clone());
        }
    }
    Ok(())
}

fn duplicate_entry(path: &Path) -> impl FnOnce(String) -> StateError {
    let path = path.to_path_buf();
    move |name| StateError::DuplicateEntry { path, name }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(error) => {
            return Err(error).with_context(|| format!("could not read file `{:?}`", path))
        }
    };

    let value = serde_json::from_str(&content)
        .with_context(|| format!("could not parse file `{:?}`", path))?;

    Ok(Some(value))
}

/// Replaces the file wholesale: write and sync a sibling temp file, then
/// rename it over `path`.
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("could not create directory `{:?}`", parent))?;
    }

    let content = serde_json::to_string_pretty(value)?;
    let temp_path = path.with_extension("json.tmp");

    let mut file = tokio::fs::File::create(&temp_path)
        .await
        .with_context(|| format!("could not create file `{:?}`", temp_path))?;
    file.write_all(content.as_bytes())
        .await
        .with_context(|| format!("could not write file `{:?}`", temp_path))?;
    file.sync_all()
        .await
        .with_context(|| format!("could not sync file `{:?}`", temp_path))?;
    drop(file);

    tokio::fs::rename(&temp_path, path)
        .await
        .with_context(|| format!("could not replace file `{:?}`", path))?;

    Ok(())
}
