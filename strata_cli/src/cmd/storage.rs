use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use strata_client::{Client, PushOption};
use strata_core::DefaultConfig;
use tokio::io::AsyncWriteExt;

use super::watch::run_watch;
use crate::Commands;
use crate::helpers::parse_cid;

pub async fn run_storage(client: &Client, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::CidConfig { cid, default } => {
            let cid = parse_cid(&cid)?;
            let config = if default {
                client.get_default_cid_config(&cid).await?
            } else {
                client.get_cid_config(&cid).await?
            };
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Commands::Push {
            cid,
            config,
            override_config,
            watch,
        } => {
            let cid = parse_cid(&cid)?;
            let mut options = Vec::new();
            if let Some(path) = config {
                let content = tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let policy: DefaultConfig = toml::from_str(&content)
                    .with_context(|| format!("invalid storage config in {}", path.display()))?;
                options.push(PushOption::CidConfig(policy.for_cid(cid)));
            }
            options.push(PushOption::Override(override_config));
            let jid = client.push_config(&cid, options).await?;
            println!("job: {jid}");
            if watch {
                run_watch(client, vec![jid]).await?;
            }
        }
        Commands::Replace { from, to, watch } => {
            let from = parse_cid(&from)?;
            let to = parse_cid(&to)?;
            let jid = client.replace(&from, &to).await?;
            println!("job: {jid}");
            if watch {
                run_watch(client, vec![jid]).await?;
            }
        }
        Commands::Remove { cid } => {
            let cid = parse_cid(&cid)?;
            client.remove(&cid).await?;
            println!("removed {cid}");
        }
        Commands::Show { cid } => {
            let info = client.show(&parse_cid(&cid)?).await?;
            let created = info
                .created
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            println!("cid: {}", info.cid);
            println!("created: {created}");
            println!("hot: enabled={} size={}", info.hot.enabled, info.hot.size);
            println!("cold: enabled={}", info.cold.enabled);
        }
        Commands::Add { path } => {
            let cid = client
                .add_to_hot_file(&path)
                .await
                .with_context(|| format!("failed to upload {}", path.display()))?;
            println!("{cid}");
        }
        Commands::Get { cid, out } => {
            let cid = parse_cid(&cid)?;
            let mut reader = client.get(&cid).await?;
            let mut file = tokio::fs::File::create(&out)
                .await
                .with_context(|| format!("failed to create {}", out.display()))?;
            let n = tokio::io::copy(&mut reader, &mut file)
                .await
                .context("download failed")?;
            file.flush().await?;
            println!("downloaded {n} bytes to {}", out.display());
        }
        _ => unreachable!("not a storage command"),
    }
    Ok(())
}
