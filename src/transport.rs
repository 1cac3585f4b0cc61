use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::MigrationError;

/// Captured diagnostic output of a successful transport operation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransportOutput {
    pub output: String,
}

#[async_trait]
pub trait MirrorTransport: Send + Sync {
    /// Clones a full mirror of `clone_url` into `scratch`, which must not exist.
    async fn fetch_mirror(
        &self,
        clone_url: &str,
        scratch: &Path,
    ) -> Result<TransportOutput, MigrationError>;

    /// Moves paths matching `pattern` into large-file storage across all of
    /// the mirror's history, in place.
    async fn rewrite_history_for_large_files(
        &self,
        scratch: &Path,
        pattern: &str,
    ) -> Result<TransportOutput, MigrationError>;

    /// Pushes every ref and tag of the mirror to `push_url`.
    async fn push_mirror(
        &self,
        scratch: &Path,
        push_url: &str,
    ) -> Result<TransportOutput, MigrationError>;
}

/// Shells out to the `git` binary (and the `git lfs` extension).
#[derive(Clone, Debug)]
pub struct GitTransport {
    pub git_binary: String,
}

impl Default for GitTransport {
    fn default() -> Self {
        GitTransport {
            git_binary: "git".to_string(),
        }
    }
}

impl GitTransport {
    async fn run(&self, args: &[&str]) -> Result<TransportOutput, MigrationError> {
        let operation = format!("{} {}", self.git_binary, args.join(" "));
        debug!(%operation, "running");

        let output = Command::new(&self.git_binary)
            .args(args)
            .output()
            .await
            .map_err(|error| MigrationError::Transport {
                operation: operation.clone(),
                status: "spawn failure".to_string(),
                output: error.to_string(),
            })?;

        let captured = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );

        if !output.status.success() {
            return Err(MigrationError::Transport {
                operation,
                status: output.status.to_string(),
                output: captured.trim().to_string(),
            });
        }

        Ok(TransportOutput { output: captured })
    }
}

/// Clone and push URLs come from state files and must not look like options.
fn url_argument(url: &str) -> Result<&str, MigrationError> {
    if url.starts_with('-') {
        return Err(MigrationError::OptionLikeArgument(url.to_string()));
    }
    Ok(url)
}

#[async_trait]
impl MirrorTransport for GitTransport {
    async fn fetch_mirror(
        &self,
        clone_url: &str,
        scratch: &Path,
    ) -> Result<TransportOutput, MigrationError> {
        let clone_url = url_argument(clone_url)?;
        let scratch = scratch.to_string_lossy();
        self.run(&["clone", "--mirror", "--", clone_url, scratch.as_ref()])
            .await
    }

    async fn rewrite_history_for_large_files(
        &self,
        scratch: &Path,
        pattern: &str,
    ) -> Result<TransportOutput, MigrationError> {
        let scratch = scratch.to_string_lossy();
        let include = format!("--include={}", pattern);
        self.run(&[
            "-C",
            scratch.as_ref(),
            "lfs",
            "migrate",
            "import",
            "--everything",
            include.as_str(),
        ])
        .await
    }

    async fn push_mirror(
        &self,
        scratch: &Path,
        push_url: &str,
    ) -> Result<TransportOutput, MigrationError> {
        let push_url = url_argument(push_url)?;
        let scratch = scratch.to_string_lossy();
        self.run(&["-C", scratch.as_ref(), "push", "--mirror", "--", push_url])
            .await
    }
}
