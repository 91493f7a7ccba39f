// End-to-end: client facade talking to the host channel server over
// a real Unix socket.

use std::{
    io,
    os::unix::fs::MetadataExt,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::bail;
use privbridge_client::BridgeClient;
use privbridge_common::document::ConfigDocument;
use privbridge_host::{
    actions::PrivilegedActions,
    channel::{unix::serve_unix, ChannelServer, DenyAllSystem},
    dispatch::{ConfigObserver, Dispatcher, SERVER_VERSION},
    identity::IdentityResolver,
    store::ConfigStore,
};
use tempfile::TempDir;
use tokio::net::UnixListener;

struct FixedResolver(u32);

impl IdentityResolver for FixedResolver {
    fn resolve(&self, _app: &str) -> anyhow::Result<u32> {
        Ok(self.0)
    }
}

#[derive(Default)]
struct RecordingActions {
    stopped: Mutex<Vec<String>>,
    fail_force_stop: bool,
}

impl PrivilegedActions for RecordingActions {
    fn force_stop(&self, app: &str) -> anyhow::Result<()> {
        if self.fail_force_stop {
            bail!("no such process");
        }
        self.stopped.lock().unwrap().push(app.to_string());
        Ok(())
    }

    fn reboot(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

struct NoObserver;

impl ConfigObserver for NoObserver {
    fn apply(&self, _document: &ConfigDocument) {}
}

struct Harness {
    client: BridgeClient,
    actions: Arc<RecordingActions>,
    server_task: tokio::task::JoinHandle<anyhow::Result<()>>,
    socket_path: PathBuf,
    #[allow(unused)]
    dir: TempDir,
}

impl Harness {
    async fn shutdown(self) {
        self.server_task.abort();
        let _ = self.server_task.await;
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

/// Serve a dispatcher whose expected client uid is `client_uid`; the
/// test process connects with its own uid.
fn start_host(client_uid: u32, actions: RecordingActions) -> Option<Harness> {
    let dir = TempDir::new().unwrap();
    let socket_path = unique_socket_path("bridge-e2e");
    let listener = match UnixListener::bind(&socket_path) {
        Ok(listener) => listener,
        Err(error) if error.kind() == io::ErrorKind::PermissionDenied => {
            eprintln!("skipping unix socket test: bind is not permitted in this environment");
            return None;
        }
        Err(error) => panic!("failed to bind unix socket: {error}"),
    };

    let actions = Arc::new(actions);
    let dispatcher = Dispatcher::new(
        "bridge-client",
        Arc::new(FixedResolver(client_uid)),
        actions.clone(),
        Arc::new(NoObserver),
        ConfigStore::new(dir.path().join("config.json"), dir.path().join("legacy.json")),
    )
    .with_allow_all_callers(false);
    let server = ChannelServer::new(Arc::new(dispatcher), Arc::new(DenyAllSystem));
    let server_task = tokio::spawn(serve_unix(listener, server));

    let client = BridgeClient::new(socket_path.clone());
    Some(Harness { client, actions, server_task, socket_path, dir })
}

fn own_uid() -> u32 {
    std::fs::metadata(std::env::temp_dir()).expect("temp dir metadata should be readable").uid()
}

#[tokio::test]
async fn facade_round_trips_version_config_and_force_stop() {
    let Some(harness) = start_host(own_uid(), RecordingActions::default()) else { return };

    assert_eq!(harness.client.server_version().await, SERVER_VERSION as i32);

    // No config yet.
    assert!(harness.client.query_config().await.is_none());

    let document = ConfigDocument::from_json(r#"{"hidden":["com.example.app"]}"#).unwrap();
    harness.client.update_config(&document).await;
    assert_eq!(harness.client.query_config().await, Some(document));

    assert!(harness.client.force_stop("com.example.app").await);
    assert_eq!(harness.actions.stopped.lock().unwrap().as_slice(), ["com.example.app"]);

    harness.shutdown().await;
}

#[tokio::test]
async fn failed_force_stop_surfaces_as_false() {
    let actions = RecordingActions { fail_force_stop: true, ..Default::default() };
    let Some(harness) = start_host(own_uid(), actions) else { return };

    assert!(!harness.client.force_stop("com.example.app").await);

    harness.shutdown().await;
}

#[tokio::test]
async fn unauthorized_client_sees_an_unavailable_bridge() {
    // Host expects a uid the test process does not run as.
    let Some(harness) = start_host(own_uid().wrapping_add(1), RecordingActions::default()) else {
        return;
    };

    assert_eq!(harness.client.server_version().await, -1);
    assert!(harness.client.query_config().await.is_none());
    assert!(!harness.client.force_stop("com.example.app").await);
    assert!(harness.actions.stopped.lock().unwrap().is_empty());

    harness.shutdown().await;
}

fn unique_socket_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("privbridge-{prefix}-{nanos}.sock"))
}
