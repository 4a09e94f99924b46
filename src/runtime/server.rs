//! Hooks handler server.

use crate::hook::{HookError, HookEvent, HookRegistry};
use crate::runtime::protocol::HookMessage;
use crate::runtime::ServerConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Hooks handler server.
///
/// Accepts connections from the test runner and dispatches suite-level
/// events to the hooks in its registry.
pub struct HooksServer {
    /// Server configuration.
    config: ServerConfig,
    /// Hooks to run.
    registry: Arc<HookRegistry>,
}

impl HooksServer {
    /// Create a new server over an explicitly provided registry.
    pub fn new(config: ServerConfig, registry: Arc<HookRegistry>) -> Self {
        Self { config, registry }
    }

    /// Get the hook registry.
    pub fn registry(&self) -> Arc<HookRegistry> {
        self.registry.clone()
    }

    /// Bind the configured address and serve until the process is stopped.
    pub async fn run(self) -> Result<(), HookError> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        self.serve(listener).await
    }

    /// Serve connections on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<(), HookError> {
        let addr: SocketAddr = listener.local_addr()?;
        info!("Hooks handler listening on {}", addr);

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let registry = self.registry.clone();
            debug!("Runner connected from {}", remote_addr);

            tokio::task::spawn(async move {
                if let Err(err) = serve_connection(stream, registry).await {
                    error!("Closing runner connection {}: {}", remote_addr, err);
                }
            });
        }
    }
}

/// Serve one runner connection until it closes.
///
/// Every message gets exactly one reply, written only after its hooks have
/// completed. A failing hook or a malformed message ends the connection
/// without a reply.
pub async fn serve_connection<S>(stream: S, registry: Arc<HookRegistry>) -> Result<(), HookError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let message = HookMessage::decode(&line)?;
        debug!("Received {} [{}]", message.event, message.uuid);

        if let Some(event) = HookEvent::from_wire(&message.event) {
            registry.run(event, &message.uuid).await?;
        }

        writer.write_all(&message.encode()?).await?;
        writer.flush().await?;
        debug!("Replied {} [{}]", message.event, message.uuid);
    }

    debug!("Runner closed the connection");
    Ok(())
}
