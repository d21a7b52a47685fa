//! The Listener - accepts incoming connections and spawns session tasks.

use crate::registry::Registry;
use crate::session::Session;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

/// Accepts TCP connections for the relay's lifetime.
pub struct Listener {
    listener: TcpListener,
    registry: Arc<Registry>,
}

impl Listener {
    /// Bind to `addr`. A bind failure is fatal to the process.
    pub async fn bind(addr: SocketAddr, registry: Arc<Registry>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "Listener bound");
        Ok(Self { listener, registry })
    }

    /// The actual bound address (relevant for ephemeral-port binds).
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, one spawned [`Session`] task per accept.
    /// Returns only on an accept failure, which is fatal; the listener
    /// never blocks on any individual session's lifetime.
    #[instrument(skip(self), name = "listener")]
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            let (stream, addr) = self.listener.accept().await?;
            let session = Session::new(stream, addr, Arc::clone(&self.registry));
            tokio::spawn(async move {
                if let Err(e) = session.run().await {
                    warn!(%addr, error = %e, "Session ended with error");
                }
            });
        }
    }
}
