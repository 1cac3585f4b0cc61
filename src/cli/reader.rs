use anyhow::Result;
use serde::Deserialize;

use super::common::{DestinationCredentials, SourceCredentials};

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Config {
    pub source: SourceCredentials,
    pub destination: DestinationCredentials,
}

pub fn read_config(config: &str) -> Result<Config> {
    let deserialized_config: Config = serde_yaml::from_str(config)?;

    Ok(deserialized_config)
}
