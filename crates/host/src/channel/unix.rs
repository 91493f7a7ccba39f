use anyhow::{Context, Result};
use tokio::io::{self, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast;
use tracing::warn;

use crate::channel::server::ChannelServer;

/// Serve the bridge socket until `shutdown` fires.
pub async fn serve_unix_until_shutdown(
    listener: UnixListener,
    server: ChannelServer,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    tokio::select! {
        result = serve_unix(listener, server) => result,
        _ = shutdown.recv() => Ok(()),
    }
}

/// Accept loop for the host socket.
///
/// Framing is newline-delimited JSON, one call per line and one reply
/// per line, matching the client transport.
pub async fn serve_unix(listener: UnixListener, server: ChannelServer) -> Result<()> {
    loop {
        let (stream, _) = listener.accept().await.context("failed to accept bridge connection")?;
        let connection_server = server.clone();
        tokio::spawn(async move {
            if let Err(error) = serve_stream(stream, connection_server).await {
                warn!(?error, "bridge connection failed");
            }
        });
    }
}

async fn serve_stream(stream: UnixStream, server: ChannelServer) -> Result<()> {
    // The kernel-reported peer uid is the caller identity for every
    // call on this connection; user space cannot spoof it.
    let caller_uid =
        stream.peer_cred().context("failed to read peer credentials")?.uid();
    serve_connection(stream, caller_uid, server).await
}

/// Handle a single connection. Split out so tests can drive arbitrary
/// caller identities over in-memory streams.
pub async fn serve_connection<IO>(stream: IO, caller_uid: u32, server: ChannelServer) -> Result<()>
where
    IO: AsyncRead + AsyncWrite + Unpin,
{
    let (read_half, mut write_half) = io::split(stream);
    let mut reader = BufReader::new(read_half);

    loop {
        let mut request_line = Vec::new();
        let bytes_read = reader
            .read_until(b'\n', &mut request_line)
            .await
            .context("failed to read host call")?;

        if bytes_read == 0 {
            return Ok(());
        }

        trim_line_endings(&mut request_line);
        if request_line.iter().all(|byte| byte.is_ascii_whitespace()) {
            continue;
        }

        let reply = server.handle_line(caller_uid, &request_line);
        let mut encoded =
            serde_json::to_vec(&reply).context("failed to serialize host reply")?;
        encoded.push(b'\n');

        write_half.write_all(&encoded).await.context("failed to write host reply")?;
        write_half.flush().await.context("failed to flush host reply")?;
    }
}

fn trim_line_endings(line: &mut Vec<u8>) {
    while matches!(line.last(), Some(b'\n' | b'\r')) {
        line.pop();
    }
}
