// Host startup: path resolution, PID file, socket creation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::net::UnixListener;
use tracing::info;

const SOCKET_NAME: &str = "bridge.sock";
/// PID file (diagnostics only).
const PID_FILE_NAME: &str = "privbridged.pid";

const SYSTEM_RUN_DIR: &str = "/run/privbridge";

/// Resolved paths for host runtime files.
pub struct DaemonPaths {
    pub base_dir: PathBuf,
    pub socket_path: PathBuf,
    pub pid_path: PathBuf,
}

impl DaemonPaths {
    /// `/run/privbridge/` when running as root, `~/.privbridge/`
    /// otherwise (development hosts).
    pub fn resolve() -> Result<Self> {
        let base = if running_as_root() {
            PathBuf::from(SYSTEM_RUN_DIR)
        } else {
            dirs::home_dir().context("could not determine home directory")?.join(".privbridge")
        };
        fs::create_dir_all(&base)
            .with_context(|| format!("failed to create `{}`", base.display()))?;
        Ok(Self::under(&base))
    }

    pub fn under(base: &Path) -> Self {
        Self {
            socket_path: base.join(SOCKET_NAME),
            pid_path: base.join(PID_FILE_NAME),
            base_dir: base.to_path_buf(),
        }
    }
}

/// Write the current process PID for diagnostics.
pub fn write_pid_file(path: &Path) -> Result<()> {
    let pid = std::process::id();
    let mut file = fs::File::create(path).context("failed to create PID file")?;
    write!(file, "{pid}").context("failed to write PID")?;
    info!(pid, path = %path.display(), "wrote PID file");
    Ok(())
}

/// Remove the PID file on shutdown.
pub fn remove_pid_file(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(error = %e, "failed to remove PID file");
        }
    }
}

/// Remove a stale socket file and bind a new Unix listener. The host
/// signals readiness by accepting connections on this socket.
pub async fn bind_socket(path: &Path) -> Result<UnixListener> {
    if path.exists() {
        fs::remove_file(path).context("failed to remove stale socket")?;
    }

    let listener = UnixListener::bind(path).context("failed to bind Unix socket")?;
    info!(path = %path.display(), "bridge socket ready");
    Ok(listener)
}

#[cfg(unix)]
fn running_as_root() -> bool {
    use std::os::unix::fs::MetadataExt;
    fs::metadata("/proc/self").map(|meta| meta.uid() == 0).unwrap_or(false)
}

#[cfg(not(unix))]
fn running_as_root() -> bool {
    false
}
