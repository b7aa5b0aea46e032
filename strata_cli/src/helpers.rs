use anyhow::{Context, Result, anyhow, bail};
use iroh::{Endpoint, EndpointAddr, EndpointId, SecretKey};
use std::path::Path;
use std::str::FromStr;
use strata_client::{Client, ClientConfig};
use strata_core::{ContentAddress, JobId};

use crate::config::{CliConfig, IdentityConfig};

fn parse_secret_key_bytes(bytes: &[u8]) -> Option<SecretKey> {
    let arr: [u8; 32] = bytes.try_into().ok()?;
    Some(SecretKey::from_bytes(&arr))
}

fn load_secret_key(identity: &IdentityConfig, config_dir: Option<&Path>) -> Result<Option<SecretKey>> {
    if let Some(s) = &identity.secret_key {
        let bytes = hex::decode(s.trim()).context("secret_key is not valid hex")?;
        return parse_secret_key_bytes(&bytes)
            .map(Some)
            .ok_or_else(|| anyhow!("secret_key must be 32 bytes"));
    }
    let Some(path_str) = &identity.secret_key_file else {
        return Ok(None);
    };
    let path = Path::new(path_str);
    let resolved = match config_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    };
    let bytes = std::fs::read(&resolved)
        .with_context(|| format!("failed to read secret key file {}", resolved.display()))?;
    parse_secret_key_bytes(&bytes)
        .map(Some)
        .ok_or_else(|| anyhow!("{} does not hold a 32 byte key", resolved.display()))
}

pub async fn build_endpoint(config: &CliConfig, config_file: &Path) -> Result<Endpoint> {
    let mut builder = Endpoint::builder();
    if let Some(sec) = load_secret_key(&config.identity, config_file.parent())? {
        builder = builder.secret_key(sec);
    }
    let endpoint = builder.bind().await?;
    Ok(endpoint)
}

pub fn service_endpoint_addr(config: &ClientConfig) -> Result<EndpointAddr> {
    if config.service.is_empty() {
        bail!("no service configured; run `strata config init --service <ENDPOINT_ID>`");
    }
    let id = EndpointId::from_str(&config.service)
        .with_context(|| format!("invalid endpoint id string '{}'", config.service))?;
    Ok(EndpointAddr::from(id))
}

/// Connects to the service of the profile in `config_file`.
pub async fn connect(config_file: &Path) -> Result<Client> {
    let config = CliConfig::load(config_file)?;
    let endpoint = build_endpoint(&config, config_file).await?;
    let addr = service_endpoint_addr(&config.client)?;
    Ok(Client::connect(endpoint, addr).with_config(config.client))
}

pub fn parse_cid(s: &str) -> Result<ContentAddress> {
    ContentAddress::parse(s.trim()).with_context(|| format!("invalid content address '{s}'"))
}

pub fn parse_jid(s: &str) -> Result<JobId> {
    let jid = JobId::parse(s.trim()).with_context(|| format!("invalid job id '{s}'"))?;
    if jid.is_empty() {
        bail!("job id must not be empty");
    }
    Ok(jid)
}
