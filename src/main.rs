use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};

use reposhift::bitbucket_provider::BitbucketProvider;
use reposhift::cli::{self, Args};
use reposhift::driver::MigrationDriver;
use reposhift::github_provider::GithubProvider;
use reposhift::logging::init_tracing;
use reposhift::prompt::StdinPrompt;
use reposhift::provider::SourceProvider;
use reposhift::state::MigrationStateStore;
use reposhift::transport::GitTransport;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json, Level::INFO);

    let config = cli::load_config(&args.config)?;

    match args.command.migrate_options()? {
        None => {
            let source = BitbucketProvider::new(config.source.clone());
            let repositories = source.list_repositories().await?;

            let store = MigrationStateStore::new(&args.workdir);
            store.write_batch(&repositories).await?;
            info!("Wrote repos file to {:?}", store.paths().batch);
        }
        Some(options) => {
            let destination = GithubProvider::new(config.destination.clone())?;
            let transport = GitTransport::default();
            let prompt = StdinPrompt;

            let driver =
                MigrationDriver::new(&args.workdir, &options, &destination, &transport, &prompt);
            let summary = driver.run().await?;

            if summary.aborted {
                info!("stopped early, rerun to continue with the pending repositories");
            }
        }
    }

    Ok(())
}
