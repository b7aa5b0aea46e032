use std::path::PathBuf;

use anyhow::Result;

use crate::Commands;
use crate::helpers::{connect, parse_cid, parse_jid};

mod instance;
mod storage;
mod watch;

pub use instance::run_instance;
pub use storage::run_storage;
pub use watch::{run_logs, run_watch};

pub async fn run_command(config_file: PathBuf, cmd: Commands) -> Result<()> {
    if let Commands::Config { cmd } = cmd {
        return cmd.run(config_file);
    }

    let client = connect(&config_file).await?;
    match cmd {
        Commands::Watch { jids } => {
            let jids = jids.iter().map(|s| parse_jid(s)).collect::<Result<Vec<_>>>()?;
            run_watch(&client, jids).await
        }
        Commands::Logs { cid, jid } => {
            let cid = parse_cid(&cid)?;
            let jid = jid.as_deref().map(parse_jid).transpose()?;
            run_logs(&client, cid, jid).await
        }
        cmd @ (Commands::Create { .. }
        | Commands::Id
        | Commands::Addrs
        | Commands::NewAddr { .. }
        | Commands::DefaultConfig { .. }
        | Commands::Info
        | Commands::Send { .. }
        | Commands::Close) => run_instance(&client, &config_file, cmd).await,
        cmd => run_storage(&client, cmd).await,
    }
}
