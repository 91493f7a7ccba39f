// Typed entry points hiding the encode/call/decode cycle.
//
// Every operation tolerates the host being unreachable: transport and
// decode failures surface as the per-method unavailable value (-1,
// `None`, `false`, or nothing), never as an error. There is no retry;
// a failed call is reported once it returns.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use privbridge_common::document::ConfigDocument;
use privbridge_common::protocol::command::{Command, EXEC_SUCCEED};
use privbridge_common::protocol::envelope::{HostCall, HostReply};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::time::timeout;
use tracing::debug;

const SYSTEM_SOCKET_PATH: &str = "/run/privbridge/bridge.sock";
const USER_SOCKET_RELATIVE_PATH: &str = ".privbridge/bridge.sock";
const DEFAULT_TIMEOUT_SECS: u64 = 3;

/// Version reported when the host is unreachable or replies with
/// something that is not a number.
pub const VERSION_UNAVAILABLE: i32 = -1;

#[derive(Debug)]
pub struct BridgeClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl Default for BridgeClient {
    fn default() -> Self {
        Self::new(default_socket_path())
    }
}

impl BridgeClient {
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path, timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS) }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Host dispatcher version, or [`VERSION_UNAVAILABLE`].
    pub async fn server_version(&self) -> i32 {
        self.connect_server(&Command::QueryServerVersion.encode())
            .await
            .and_then(|reply| reply.parse::<i32>().ok())
            .unwrap_or(VERSION_UNAVAILABLE)
    }

    /// Fire-and-forget: the host may disappear mid-call, so no reply
    /// is expected.
    pub async fn reboot(&self) {
        let _ = self.connect_server(&Command::RebootSystem.encode()).await;
    }

    /// Ask the host to copy its legacy config file into place.
    ///
    /// Blocks on host-side file I/O; keep it off latency-sensitive
    /// paths.
    pub async fn migrate_old_config(&self) {
        let _ = self.connect_server(&Command::MigrateOldConfig.encode()).await;
    }

    /// The persisted config document, or `None` when the host has no
    /// config yet, is unreachable, or returns text that fails to
    /// parse.
    pub async fn query_config(&self) -> Option<ConfigDocument> {
        let raw = self.connect_server(&Command::QueryConfig.encode()).await?;
        if raw.trim().is_empty() {
            return None;
        }
        match ConfigDocument::from_json(&raw) {
            Ok(document) => Some(document),
            Err(error) => {
                debug!(%error, "persisted config is invalid");
                None
            }
        }
    }

    /// Send a replacement config document. Fire-and-forget: the host
    /// persists silently and malformed documents are silently dropped
    /// on its side, so there is no confirmation to report.
    pub async fn update_config(&self, document: &ConfigDocument) {
        let _ = self.connect_server(&Command::UpdateConfig(document.to_json()).encode()).await;
    }

    /// True iff the host reports the stop succeeded. Transport
    /// failure and host-side failure both read as `false`.
    pub async fn force_stop(&self, app: &str) -> bool {
        self.connect_server(&Command::ForceStop(app.to_string()).encode()).await.as_deref()
            == Some(EXEC_SUCCEED)
    }

    /// One round trip on the repurposed call. All failures collapse
    /// to `None`, indistinguishable from the call returning no value.
    async fn connect_server(&self, request: &str) -> Option<String> {
        match self.call_installer(request).await {
            Ok(value) => value,
            Err(error) => {
                debug!(%error, "bridge call failed");
                None
            }
        }
    }

    async fn call_installer(&self, arg: &str) -> Result<Option<String>> {
        let call = HostCall::Installer { arg: arg.to_string() };
        let mut payload = serde_json::to_vec(&call).context("failed to serialize host call")?;
        payload.push(b'\n');

        let stream = timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .context("timed out connecting to bridge socket")?
            .with_context(|| {
                format!("failed to connect to bridge socket `{}`", self.socket_path.display())
            })?;

        let (read_half, mut write_half) = stream.into_split();
        timeout(self.timeout, write_half.write_all(&payload))
            .await
            .context("timed out writing host call")?
            .context("failed writing host call to bridge socket")?;
        timeout(self.timeout, write_half.flush())
            .await
            .context("timed out flushing host call")?
            .context("failed flushing host call to bridge socket")?;

        let mut reader = BufReader::new(read_half);
        let mut reply_line = Vec::new();
        timeout(self.timeout, reader.read_until(b'\n', &mut reply_line))
            .await
            .context("timed out waiting for bridge reply")?
            .context("failed reading bridge reply")?;

        if reply_line.is_empty() {
            anyhow::bail!("bridge returned an empty reply");
        }

        match serde_json::from_slice::<HostReply>(&reply_line)
            .context("failed to decode bridge reply")?
        {
            HostReply::Value { value } => Ok(value),
            HostReply::Granted { .. } => {
                anyhow::bail!("bridge replied to the wrong call shape")
            }
        }
    }
}

fn default_socket_path() -> PathBuf {
    let system = PathBuf::from(SYSTEM_SOCKET_PATH);
    if system.exists() {
        return system;
    }
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(USER_SOCKET_RELATIVE_PATH)
}
