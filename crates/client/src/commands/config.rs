// `privbridge config` — read or replace the persisted document.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};
use privbridge_common::document::ConfigDocument;

use crate::commands::{block_on, client_for};

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,

    /// Bridge socket path override.
    #[arg(long)]
    socket: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the current document as JSON
    Get,
    /// Replace the document with JSON read from a file, or stdin for `-`
    Set { file: PathBuf },
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let client = client_for(args.socket);
    match args.action {
        ConfigAction::Get => match block_on(client.query_config()) {
            Some(document) => {
                println!("{}", document.to_json());
                Ok(())
            }
            None => anyhow::bail!("no config document available"),
        },
        ConfigAction::Set { file } => {
            let raw = read_document_text(&file)?;
            // Validate locally; the host drops malformed writes
            // without telling us.
            let document = ConfigDocument::from_json(&raw)
                .context("input is not a valid config document")?;
            block_on(client.update_config(&document));
            Ok(())
        }
    }
}

fn read_document_text(file: &PathBuf) -> anyhow::Result<String> {
    if file.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw).context("failed to read stdin")?;
        Ok(raw)
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("failed to read `{}`", file.display()))
    }
}
