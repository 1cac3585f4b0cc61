pub mod bitbucket_provider;
pub mod cli;
pub mod descriptor;
pub mod driver;
pub mod error;
pub mod fixtures;
pub mod github_provider;
pub mod logging;
pub mod prompt;
pub mod provider;
pub mod scratch;
pub mod state;
pub mod transport;
