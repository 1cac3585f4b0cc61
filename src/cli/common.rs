use serde::Deserialize;

pub const DEFAULT_BITBUCKET_URL: &str = "https://api.bitbucket.org";
pub const DEFAULT_GITHUB_URL: &str = "https://api.github.com";

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SourceCredentials {
    pub workspace: String,
    pub username: String,
    pub app_password: String,
    pub base_url: Option<String>,
}

impl SourceCredentials {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BITBUCKET_URL)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DestinationCredentials {
    pub organization: String,
    pub token: String,
    pub base_url: Option<String>,
    #[serde(default = "default_private")]
    pub private: bool,
}

impl DestinationCredentials {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_GITHUB_URL)
    }
}

fn default_private() -> bool {
    true
}
