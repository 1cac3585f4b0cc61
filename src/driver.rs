//! Sequential migration of the pending batch.
//!
//! Each repository walks the same steps:
//!
//! 1. `Selected`: head of Pending is taken.
//! 2. `DestinationResolved`: an empty destination is reused, a missing one
//!    is created, a populated one fails the repository.
//! 3. `Mirrored`: a fresh mirror is cloned into the scratch directory.
//! 4. `HistoryRewritten`: only with an LFS pattern.
//! 5. `ConfirmedForPush`: only with `--confirm-before-push`; "no" stops the
//!    whole batch.
//! 6. `Pushed`
//! 7. `Cleaned`: the scratch directory is removed whatever happened before.
//! 8. `Recorded`: Done (or Failed) and Pending are flushed to disk before the
//!    next repository is taken.

use std::path::Path;

use anyhow::Result;
use tracing::{debug, error, info};

use crate::cli::MigrateOptions;
use crate::descriptor::RepositoryDescriptor;
use crate::error::MigrationError;
use crate::prompt::Confirm;
use crate::provider::{resolve_target, DestinationProvider};
use crate::scratch::ScratchSpace;
use crate::state::{MigrationState, MigrationStateStore};
use crate::transport::{MirrorTransport, TransportOutput};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MigrationStep {
    Selected,
    DestinationResolved,
    Mirrored,
    HistoryRewritten,
    ConfirmedForPush,
    Pushed,
    Cleaned,
    Recorded,
}

#[derive(Debug)]
pub struct StepFailure {
    pub step: MigrationStep,
    pub error: MigrationError,
}

#[derive(Debug)]
pub enum Attempt {
    Migrated,
    Failed(StepFailure),
    Aborted,
}

/// Why a repository stopped before `Pushed`.
enum Interruption {
    Failed(StepFailure),
    Aborted,
    Fatal(anyhow::Error),
}

fn failed_at(step: MigrationStep) -> impl FnOnce(MigrationError) -> Interruption {
    move |error| Interruption::Failed(StepFailure { step, error })
}

/// Counts for the repositories handled by this run only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchSummary {
    pub migrated: usize,
    pub failed: usize,
    pub aborted: bool,
}

pub struct MigrationDriver<'a> {
    options: &'a MigrateOptions,
    store: MigrationStateStore,
    scratch: ScratchSpace,
    destination: &'a dyn DestinationProvider,
    transport: &'a dyn MirrorTransport,
    prompt: &'a dyn Confirm,
}

impl<'a> MigrationDriver<'a> {
    pub fn new(
        workdir: &Path,
        options: &'a MigrateOptions,
        destination: &'a dyn DestinationProvider,
        transport: &'a dyn MirrorTransport,
        prompt: &'a dyn Confirm,
    ) -> Self {
        MigrationDriver {
            options,
            store: MigrationStateStore::new(workdir),
            scratch: ScratchSpace::new(workdir),
            destination,
            transport,
            prompt,
        }
    }

    /// Processes Pending until it is empty or the operator says no. Errors
    /// returned here are fatal: a missing batch or state that cannot be
    /// written. Per-repository failures are recorded, not returned.
    pub async fn run(&self) -> Result<BatchSummary> {
        let mut state = self.store.load().await?;
        let mut summary = BatchSummary::default();

        loop {
            info!("{} repositories remaining", state.pending.len());
            let repository = match state.take_next() {
                Some(repository) => repository,
                None => break,
            };

            match self.migrate_repository(&repository).await? {
                Attempt::Migrated => {
                    self.record_success(&mut state, repository).await?;
                    summary.migrated += 1;
                }
                Attempt::Failed(failure) => {
                    error!(
                        repository = %repository.name,
                        step = ?failure.step,
                        error = %failure.error,
                        "failed to migrate repository"
                    );
                    self.record_failure(&mut state, repository).await?;
                    summary.failed += 1;
                }
                Attempt::Aborted => {
                    info!(repository = %repository.name, "push declined, stopping batch");
                    summary.aborted = true;
                    return Ok(summary);
                }
            }

            if self.options.confirm_before_next
                && !state.pending.is_empty()
                && !self
                    .prompt
                    .confirm("Continue with the next repository?")
                    .await?
            {
                info!("stopping batch at operator request");
                summary.aborted = true;
                return Ok(summary);
            }
        }

        info!(
            migrated = summary.migrated,
            failed = summary.failed,
            "batch complete"
        );
        Ok(summary)
    }

    /// Steps 2 to 7 for one repository. The scratch directory is gone when
    /// this returns, whatever the attempt's outcome.
    pub async fn migrate_repository(&self, repository: &RepositoryDescriptor) -> Result<Attempt> {
        info!(repository = %repository.name, "migrating");

        let scratch_path = match self.scratch.path_for(&repository.name) {
            Ok(path) => path,
            Err(error) => {
                return Ok(Attempt::Failed(StepFailure {
                    step: MigrationStep::Selected,
                    error,
                }))
            }
        };

        let outcome = self.drive(repository, &scratch_path).await;

        debug!(repository = %repository.name, step = ?MigrationStep::Cleaned, "removing local mirror");
        if let Err(error) = self.scratch.clear(&scratch_path).await {
            error!(repository = %repository.name, %error, "local mirror left behind");
        }

        match outcome {
            Ok(()) => Ok(Attempt::Migrated),
            Err(Interruption::Failed(failure)) => Ok(Attempt::Failed(failure)),
            Err(Interruption::Aborted) => Ok(Attempt::Aborted),
            Err(Interruption::Fatal(error)) => Err(error),
        }
    }

    async fn drive(
        &self,
        repository: &RepositoryDescriptor,
        scratch_path: &Path,
    ) -> Result<(), Interruption> {
        let name = &repository.name;

        info!(repository = %name, "1. Resolving destination repository");
        let target = resolve_target(self.destination, name)
            .await
            .map_err(failed_at(MigrationStep::DestinationResolved))?;

        info!(repository = %name, "2. Mirroring source repository locally");
        self.scratch
            .prepare(scratch_path)
            .await
            .map_err(failed_at(MigrationStep::Mirrored))?;
        let output = self
            .transport
            .fetch_mirror(&repository.clone_url, scratch_path)
            .await
            .map_err(failed_at(MigrationStep::Mirrored))?;
        log_output(name, MigrationStep::Mirrored, &output);

        if let Some(pattern) = &self.options.lfs {
            info!(repository = %name, pattern = pattern.as_str(), "3. Rewriting history into LFS");
            let output = self
                .transport
                .rewrite_history_for_large_files(scratch_path, pattern.as_str())
                .await
                .map_err(failed_at(MigrationStep::HistoryRewritten))?;
            log_output(name, MigrationStep::HistoryRewritten, &output);
        }

        if self.options.confirm_before_push {
            let question = format!("Push `{}` to {}?", name, target.push_url());
            match self.prompt.confirm(&question).await {
                Ok(true) => {
                    debug!(repository = %name, step = ?MigrationStep::ConfirmedForPush, "push confirmed")
                }
                Ok(false) => return Err(Interruption::Aborted),
                Err(error) => return Err(Interruption::Fatal(error)),
            }
        }

        info!(repository = %name, "4. Pushing mirror to destination");
        let output = self
            .transport
            .push_mirror(scratch_path, target.push_url())
            .await
            .map_err(failed_at(MigrationStep::Pushed))?;
        log_output(name, MigrationStep::Pushed, &output);

        Ok(())
    }

    async fn record_success(
        &self,
        state: &mut MigrationState,
        repository: RepositoryDescriptor,
    ) -> Result<()> {
        debug!(repository = %repository.name, step = ?MigrationStep::Recorded, "recording success");
        state.record_done(repository);
        self.store.persist_done(&state.done).await?;
        self.store.persist_pending(&state.pending).await
    }

    async fn record_failure(
        &self,
        state: &mut MigrationState,
        repository: RepositoryDescriptor,
    ) -> Result<()> {
        if self.options.ignore_failure {
            info!(repository = %repository.name, "ignoring failure, repository not recorded");
        } else {
            state.record_failed(repository);
            self.store.persist_failed(&state.failed).await?;
        }
        self.store.persist_pending(&state.pending).await
    }
}

fn log_output(name: &str, step: MigrationStep, output: &TransportOutput) {
    if !output.output.is_empty() {
        debug!(repository = %name, step = ?step, output = %output.output.trim_end());
    }
}
