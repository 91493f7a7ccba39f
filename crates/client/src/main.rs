// privbridge CLI entry point.

use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "privbridge", about = "Command channel to the privileged bridge host")]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    commands::run(cli.command)
}
