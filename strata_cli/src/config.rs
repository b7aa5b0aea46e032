use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use strata_client::ClientConfig;

/// A profile file: `[client]` settings plus the endpoint identity.
#[derive(Debug, Deserialize)]
pub struct CliConfig {
    pub client: ClientConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct IdentityConfig {
    /// Hex encoded secret key, preferred over `secret_key_file`.
    pub secret_key: Option<String>,
    /// Relative paths resolve against the profile's directory.
    pub secret_key_file: Option<String>,
}

impl CliConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).with_context(|| {
            format!(
                "failed to read {}; run `strata config init` first",
                path.display()
            )
        })?;
        toml::from_str(&content).with_context(|| format!("invalid config file {}", path.display()))
    }
}
