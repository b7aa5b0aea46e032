use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Subcommand;
use rand::RngCore;
use toml_edit::{DocumentMut, Item, Table};
use tracing::info;

#[derive(Subcommand)]
pub enum CmdConfig {
    /// Creates the profile config if it doesn't exist and generates a keypair
    Init {
        /// Endpoint id of the storage service
        #[arg(long, value_name = "ENDPOINT_ID")]
        service: Option<String>,
    },
    /// Stores an instance token in the profile
    SetToken { token: String },
}

impl CmdConfig {
    pub fn run(self, config_file: PathBuf) -> anyhow::Result<()> {
        let mut doc = read_doc(&config_file)?;

        match self {
            Self::Init { service } => {
                let secretkey_file = config_file.with_extension("secretkey");
                let secretkey_name = secretkey_file
                    .file_name()
                    .and_then(|name| name.to_str())
                    .context("config file name is not valid UTF-8")?
                    .to_owned();
                table_mut(&mut doc, "identity")?.insert("secret_key_file", secretkey_name.into());

                let client = table_mut(&mut doc, "client")?;
                match service {
                    Some(service) => {
                        client.insert("service", service.into());
                    }
                    None => {
                        client.entry("service").or_insert("".into());
                    }
                }

                if !secretkey_file.exists() {
                    info!("generating secure random secret key for client");
                    let mut bytes = [0u8; 32];
                    rand::rng().fill_bytes(&mut bytes);
                    fs::write(secretkey_file, bytes)?;
                }
            }
            Self::SetToken { token } => set_token(&mut doc, token)?,
        }

        write_doc(&config_file, &doc)
    }
}

/// Records `token` as the instance token of the profile in `config_file`.
pub fn save_token(config_file: &Path, token: String) -> anyhow::Result<()> {
    let mut doc = read_doc(config_file)?;
    set_token(&mut doc, token)?;
    write_doc(config_file, &doc)
}

fn set_token(doc: &mut DocumentMut, token: String) -> anyhow::Result<()> {
    table_mut(doc, "client")?.insert("token", token.into());
    Ok(())
}

fn table_mut<'a>(doc: &'a mut DocumentMut, key: &str) -> anyhow::Result<&'a mut Table> {
    doc.entry(key)
        .or_insert(Item::Table(Table::new()))
        .as_table_mut()
        .with_context(|| format!("`{key}` in the config file is not a table"))
}

fn read_doc(config_file: &Path) -> anyhow::Result<DocumentMut> {
    let content = if config_file.exists() {
        fs::read_to_string(config_file)?
    } else {
        if let Some(parent) = config_file.parent() {
            fs::create_dir_all(parent)?;
        }
        String::new()
    };
    content
        .parse::<DocumentMut>()
        .context("could not parse config file")
}

fn write_doc(config_file: &Path, doc: &DocumentMut) -> anyhow::Result<()> {
    info!("writing to config file {config_file:?}");

    let tmp_path = config_file.with_extension("tmp");
    let mut tmp = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)?;
    tmp.write_all(doc.to_string().as_bytes())?;
    tmp.sync_all()?;
    fs::rename(&tmp_path, config_file)?;
    Ok(())
}
