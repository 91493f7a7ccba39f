// `privbridge version` — query the host dispatcher version.

use std::path::PathBuf;

use clap::Args;

use crate::commands::{block_on, client_for};

#[derive(Debug, Args)]
pub struct VersionArgs {
    /// Bridge socket path override.
    #[arg(long)]
    socket: Option<PathBuf>,
}

pub fn run(args: VersionArgs) -> anyhow::Result<()> {
    let client = client_for(args.socket);
    let version = block_on(client.server_version());
    if version < 0 {
        anyhow::bail!("bridge host is unavailable");
    }
    println!("{version}");
    Ok(())
}
