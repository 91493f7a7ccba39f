// `privbridge reboot` — fire-and-forget system reboot.

use std::path::PathBuf;

use clap::Args;

use crate::commands::{block_on, client_for};

#[derive(Debug, Args)]
pub struct RebootArgs {
    /// Bridge socket path override.
    #[arg(long)]
    socket: Option<PathBuf>,

    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    yes: bool,
}

pub fn run(args: RebootArgs) -> anyhow::Result<()> {
    if !args.yes {
        anyhow::bail!("rebooting is irreversible; pass --yes to confirm");
    }
    let client = client_for(args.socket);
    // The host may go down before replying; nothing to report.
    block_on(client.reboot());
    Ok(())
}
