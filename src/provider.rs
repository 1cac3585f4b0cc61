use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::descriptor::RepositoryDescriptor;
use crate::error::MigrationError;

#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Every repository of the configured workspace, in provider order.
    async fn list_repositories(&self) -> anyhow::Result<Vec<RepositoryDescriptor>>;
}

/// Destination repository as returned by the provider API. All fields are
/// mandatory; a response lacking one fails deserialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DestinationRepository {
    pub name: String,
    pub ssh_url: String,
    pub size: u64,
}

#[async_trait]
pub trait DestinationProvider: Send + Sync {
    async fn find_repository(&self, name: &str) -> anyhow::Result<Option<DestinationRepository>>;

    async fn create_repository(&self, name: &str) -> anyhow::Result<DestinationRepository>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum DestinationTarget {
    Reused { push_url: String },
    Created { push_url: String },
}

impl DestinationTarget {
    pub fn push_url(&self) -> &str {
        match self {
            DestinationTarget::Reused { push_url } | DestinationTarget::Created { push_url } => {
                push_url
            }
        }
    }
}

/// Finds or creates the destination for `name`. An existing destination that
/// already holds content is never reused.
pub async fn resolve_target(
    provider: &dyn DestinationProvider,
    name: &str,
) -> Result<DestinationTarget, MigrationError> {
    match provider.find_repository(name).await? {
        Some(existing) if existing.size > 0 => Err(MigrationError::DestinationConflict {
            name: name.to_string(),
            size: existing.size,
        }),
        Some(existing) => {
            info!(repository = %name, "reusing empty destination repository");
            Ok(DestinationTarget::Reused {
                push_url: existing.ssh_url,
            })
        }
        None => {
            let created = provider.create_repository(name).await?;
            info!(repository = %name, "created destination repository");
            Ok(DestinationTarget::Created {
                push_url: created.ssh_url,
            })
        }
    }
}
