// `privbridge migrate` — one-shot legacy config migration on the host.

use std::path::PathBuf;

use clap::Args;

use crate::commands::{block_on, client_for};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Bridge socket path override.
    #[arg(long)]
    socket: Option<PathBuf>,
}

pub fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let client = client_for(args.socket);
    block_on(client.migrate_old_config());
    println!("migration requested");
    Ok(())
}
