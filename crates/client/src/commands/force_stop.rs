// `privbridge force-stop` — stop an application through the host.

use std::path::PathBuf;

use clap::Args;

use crate::commands::{block_on, client_for};

#[derive(Debug, Args)]
pub struct ForceStopArgs {
    /// Application name to stop.
    app: String,

    /// Bridge socket path override.
    #[arg(long)]
    socket: Option<PathBuf>,
}

pub fn run(args: ForceStopArgs) -> anyhow::Result<()> {
    let client = client_for(args.socket);
    if block_on(client.force_stop(&args.app)) {
        println!("stopped {}", args.app);
        Ok(())
    } else {
        anyhow::bail!("failed to stop {}", args.app)
    }
}
