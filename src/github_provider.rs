use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::Octocrab;
use serde_json::json;

use crate::cli::DestinationCredentials;
use crate::provider::{DestinationProvider, DestinationRepository};

const NOT_FOUND: &str = "Not Found";

pub struct GithubProvider {
    pub credentials: DestinationCredentials,
    instance: Octocrab,
}

impl GithubProvider {
    pub fn new(credentials: DestinationCredentials) -> Result<Self> {
        let instance = configure_provider(&credentials)?;

        Ok(GithubProvider {
            credentials,
            instance,
        })
    }
}

fn configure_provider(credentials: &DestinationCredentials) -> Result<Octocrab> {
    Octocrab::builder()
        .personal_token(credentials.token.clone())
        .base_url(credentials.base_url())
        .with_context(|| format!("invalid GitHub base url `{}`", credentials.base_url()))?
        .build()
        .context("could not build GitHub client")
}

#[async_trait]
impl DestinationProvider for GithubProvider {
    async fn find_repository(&self, name: &str) -> Result<Option<DestinationRepository>> {
        let route = format!(
            "/repos/{owner}/{repo}",
            owner = self.credentials.organization,
            repo = name
        );

        let result: octocrab::Result<DestinationRepository> =
            self.instance.get(&route, None::<&()>).await;

        match result {
            Ok(repository) => Ok(Some(repository)),
            Err(octocrab::Error::GitHub { source, .. }) if source.message == NOT_FOUND => Ok(None),
            Err(error) => Err(error).with_context(|| format!("GitHub lookup of `{}` failed", name)),
        }
    }

    async fn create_repository(&self, name: &str) -> Result<DestinationRepository> {
        let route = format!("/orgs/{org}/repos", org = self.credentials.organization);
        let body = json!({
            "name": name,
            "private": self.credentials.private,
        });

        let repository: DestinationRepository = self
            .instance
            .post(&route, Some(&body))
            .await
            .with_context(|| format!("GitHub API error creating `{}`", name))?;

        Ok(repository)
    }
}
