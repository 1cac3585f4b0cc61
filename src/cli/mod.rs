pub mod common;
pub mod parser;
pub mod reader;

pub use common::*;
pub use parser::{parse_lfs_pattern, LargeFilePattern, MigrateOptions};
pub use reader::Config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reader::read_config;
use std::path::PathBuf;

#[derive(Parser)]
#[clap(author, version, about = "Moves repositories from Bitbucket to GitHub, resumably")]
pub struct Args {
    #[clap(short, long, parse(from_os_str), default_value = "migration.yaml", global = true)]
    pub config: PathBuf,

    /// Directory holding the `repos/` state files and mirrors
    #[clap(short, long, parse(from_os_str), default_value = ".", global = true)]
    pub workdir: PathBuf,

    /// Emit JSON-formatted log lines
    #[clap(long, global = true)]
    pub json: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Enumerate the source workspace and write the batch file
    List,
    /// Migrate every pending repository
    Migrate {
        #[clap(long)]
        confirm_before_push: bool,

        #[clap(long)]
        confirm_before_next: bool,

        /// Drop failed repositories instead of recording them
        #[clap(long)]
        ignore_failure: bool,

        /// Rewrite matching paths into Git LFS before pushing
        #[clap(long)]
        lfs: Option<String>,
    },
}

impl Command {
    pub fn migrate_options(&self) -> Result<Option<MigrateOptions>> {
        match self {
            Command::List => Ok(None),
            Command::Migrate {
                confirm_before_push,
                confirm_before_next,
                ignore_failure,
                lfs,
            } => Ok(Some(MigrateOptions {
                confirm_before_push: *confirm_before_push,
                confirm_before_next: *confirm_before_next,
                ignore_failure: *ignore_failure,
                lfs: lfs.as_deref().map(parse_lfs_pattern).transpose()?,
            })),
        }
    }
}

pub fn load_config(path: &std::path::Path) -> Result<Config> {
    let result = std::fs::read_to_string(path)
        .with_context(|| format!("could not read file `{:?}`", path))?;

    read_config(&result).with_context(|| format!("could not parse config `{:?}`", path))
}
