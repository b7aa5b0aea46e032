use std::path::Path;

use anyhow::{Context, Result};
use strata_client::{Client, NewAddrOption};
use strata_core::DefaultConfig;
use tracing::info;

use crate::Commands;
use crate::init_config::save_token;

pub async fn run_instance(client: &Client, config_file: &Path, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Create { save } => {
            let (id, token) = client.create().await.context("failed to create instance")?;
            println!("instance: {id}");
            println!("token: {token}");
            if save {
                save_token(config_file, token)?;
                info!("token saved to {}", config_file.display());
            }
        }
        Commands::Id => {
            println!("{}", client.id().await?);
        }
        Commands::Addrs => {
            for addr in client.addrs().await? {
                println!("{}\t{}\t{}", addr.name, addr.addr, addr.addr_type);
            }
        }
        Commands::NewAddr {
            name,
            addr_type,
            make_default,
        } => {
            let mut options = vec![NewAddrOption::MakeDefault(make_default)];
            if let Some(addr_type) = addr_type {
                options.push(NewAddrOption::AddressType(addr_type));
            }
            let addr = client.new_addr(&name, options).await?;
            println!("{addr}");
        }
        Commands::DefaultConfig { set: Some(path) } => {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let config: DefaultConfig = toml::from_str(&content)
                .with_context(|| format!("invalid storage config in {}", path.display()))?;
            client.set_default_config(&config).await?;
            println!("default config updated");
        }
        Commands::DefaultConfig { set: None } => {
            let config = client.default_config().await?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Commands::Info => {
            let info = client.info().await?;
            println!("instance: {}", info.id);
            println!("balances:");
            for balance in &info.balances {
                println!(
                    "  {}\t{}\t{}",
                    balance.addr.name, balance.addr.addr, balance.balance
                );
            }
            println!("pins:");
            for cid in &info.pins {
                println!("  {cid}");
            }
            println!("default config:");
            print!("{}", toml::to_string_pretty(&info.default_config)?);
        }
        Commands::Send { from, to, amount } => {
            client.send_funds(&from, &to, amount).await?;
            println!("queued transfer of {amount} from {from} to {to}");
        }
        Commands::Close => {
            client.close().await?;
            println!("instance closed");
        }
        _ => unreachable!("not an instance command"),
    }
    Ok(())
}
