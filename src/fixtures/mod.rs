pub mod bitbucket;
pub mod descriptor;
pub mod github;
