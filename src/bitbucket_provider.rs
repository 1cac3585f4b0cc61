use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::cli::SourceCredentials;
use crate::descriptor::RepositoryDescriptor;
use crate::provider::SourceProvider;

const SSH_CLONE_LINK: &str = "ssh";

#[derive(Debug, Deserialize)]
struct RepositoryPage {
    values: Vec<BitbucketRepository>,
    // Absent on the last page.
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BitbucketRepository {
    name: String,
    links: RepositoryLinks,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RepositoryLinks {
    clone: Vec<CloneLink>,
}

#[derive(Debug, Deserialize)]
struct CloneLink {
    name: String,
    href: String,
}

impl BitbucketRepository {
    fn into_descriptor(self) -> Result<RepositoryDescriptor> {
        let clone_url = self
            .links
            .clone
            .into_iter()
            .find(|link| link.name == SSH_CLONE_LINK)
            .map(|link| link.href)
            .ok_or_else(|| anyhow!("repository `{}` has no ssh clone link", self.name))?;

        Ok(RepositoryDescriptor {
            name: self.name,
            clone_url,
            metadata: self.rest,
        })
    }
}

pub struct BitbucketProvider {
    pub credentials: SourceCredentials,
    client: reqwest::Client,
}

impl BitbucketProvider {
    pub fn new(credentials: SourceCredentials) -> Self {
        BitbucketProvider {
            credentials,
            client: reqwest::Client::new(),
        }
    }

    fn first_page_url(&self) -> String {
        format!(
            "{base}/2.0/repositories/{workspace}",
            base = self.credentials.base_url().trim_end_matches('/'),
            workspace = self.credentials.workspace
        )
    }

    fn authorization(&self) -> String {
        let pair = format!(
            "{}:{}",
            self.credentials.username, self.credentials.app_password
        );
        format!("Basic {}", base64::encode(pair))
    }

    async fn get_page(&self, url: &str) -> Result<RepositoryPage> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .send()
            .await
            .with_context(|| format!("request to `{}` failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Bitbucket API error {} for `{}`: {}", status, url, body);
        }

        response
            .json::<RepositoryPage>()
            .await
            .with_context(|| format!("unexpected repository page from `{}`", url))
    }
}

#[async_trait]
impl SourceProvider for BitbucketProvider {
    async fn list_repositories(&self) -> Result<Vec<RepositoryDescriptor>> {
        let mut repositories = Vec::new();
        let mut url = Some(self.first_page_url());

        while let Some(page_url) = url {
            debug!(url = %page_url, "fetching repository page");
            let page = self.get_page(&page_url).await?;

            for repository in page.values {
                repositories.push(repository.into_descriptor()?);
            }
            url = page.next;
        }

        info!(
            workspace = %self.credentials.workspace,
            count = repositories.len(),
            "enumerated source repositories"
        );

        Ok(repositories)
    }
}
