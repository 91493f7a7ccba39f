// CLI subcommand dispatch.

use std::future::Future;
use std::path::PathBuf;

use clap::Subcommand;

use privbridge_client::BridgeClient;

pub mod config;
pub mod force_stop;
pub mod migrate;
pub mod reboot;
pub mod version;

#[derive(Subcommand)]
pub enum Command {
    /// Print the bridge host's version
    Version(version::VersionArgs),
    /// Reboot the device through the bridge
    Reboot(reboot::RebootArgs),
    /// Copy the host's legacy config file into place
    Migrate(migrate::MigrateArgs),
    /// Force-stop an application by name
    ForceStop(force_stop::ForceStopArgs),
    /// Read or replace the persisted config document
    Config(config::ConfigArgs),
}

pub fn run(cmd: Command) -> anyhow::Result<()> {
    match cmd {
        Command::Version(args) => version::run(args),
        Command::Reboot(args) => reboot::run(args),
        Command::Migrate(args) => migrate::run(args),
        Command::ForceStop(args) => force_stop::run(args),
        Command::Config(args) => config::run(args),
    }
}

/// Drive a facade call from the synchronous CLI, reusing an ambient
/// runtime when one exists.
pub(crate) fn block_on<F: Future>(future: F) -> F::Output {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle.block_on(future),
        Err(_) => tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime should build")
            .block_on(future),
    }
}

pub(crate) fn client_for(socket: Option<PathBuf>) -> BridgeClient {
    match socket {
        Some(path) => BridgeClient::new(path),
        None => BridgeClient::default(),
    }
}
