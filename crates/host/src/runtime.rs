// Standalone host runtime: dependency wiring and lifecycle.

use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use privbridge_common::document::ConfigDocument;
use tokio::sync::broadcast;
use tracing::info;

use crate::actions::ProcessActions;
use crate::channel::unix::serve_unix_until_shutdown;
use crate::channel::{ChannelServer, DenyAllSystem};
use crate::config::HostConfig;
use crate::dispatch::{ConfigObserver, Dispatcher};
use crate::identity::PasswdResolver;
use crate::startup::{bind_socket, remove_pid_file, write_pid_file, DaemonPaths};
use crate::store::ConfigStore;

/// Keeps the most recently accepted config document available to the
/// rest of the host process.
#[derive(Default)]
pub struct LatestConfig(RwLock<Option<ConfigDocument>>);

impl LatestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<ConfigDocument> {
        self.0.read().ok().and_then(|slot| slot.clone())
    }
}

impl ConfigObserver for LatestConfig {
    fn apply(&self, document: &ConfigDocument) {
        info!("applying updated config document");
        if let Ok(mut slot) = self.0.write() {
            *slot = Some(document.clone());
        }
    }
}

pub async fn run_standalone() -> Result<()> {
    run_standalone_with_paths(DaemonPaths::resolve()?).await
}

async fn run_standalone_with_paths(paths: DaemonPaths) -> Result<()> {
    let config = HostConfig::load(&paths.base_dir);
    let listener = bind_socket(&paths.socket_path).await?;
    write_pid_file(&paths.pid_path)?;

    let dispatcher = Dispatcher::new(
        config.client_app.clone(),
        Arc::new(PasswdResolver::new()),
        Arc::new(ProcessActions),
        Arc::new(LatestConfig::new()),
        ConfigStore::new(config.config_path.clone(), config.legacy_config_path.clone()),
    )
    .with_allow_all_callers(config.allow_all_callers);
    let server = ChannelServer::new(Arc::new(dispatcher), Arc::new(DenyAllSystem));

    let (shutdown_tx, shutdown_rx) = broadcast::channel(4);
    let ctrl_c_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = ctrl_c_tx.send(());
    });

    info!(
        socket_path = %paths.socket_path.display(),
        client_app = %config.client_app,
        "privbridge host started"
    );
    let result = serve_unix_until_shutdown(listener, server, shutdown_rx).await;
    remove_pid_file(&paths.pid_path);
    let _ = std::fs::remove_file(&paths.socket_path);
    result.context("host daemon exited with error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_config_tracks_the_last_applied_document() {
        let latest = LatestConfig::new();
        assert!(latest.get().is_none());

        let first = ConfigDocument::from_json(r#"{"v":1}"#).unwrap();
        let second = ConfigDocument::from_json(r#"{"v":2}"#).unwrap();
        latest.apply(&first);
        latest.apply(&second);
        assert_eq!(latest.get(), Some(second));
    }
}
