//! Test server management.
//!
//! Spawns the relay in-process on an ephemeral port so tests never race
//! over fixed port numbers.

use relayd::listener::Listener;
use relayd::registry::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// An in-process relay instance.
pub struct TestServer {
    addr: SocketAddr,
    registry: Arc<Registry>,
    accept_task: JoinHandle<()>,
}

impl TestServer {
    /// Bind on 127.0.0.1:0 and start the accept loop.
    pub async fn spawn() -> anyhow::Result<Self> {
        let registry = Arc::new(Registry::new());
        let listener = Listener::bind("127.0.0.1:0".parse()?, Arc::clone(&registry)).await?;
        let addr = listener.local_addr()?;

        let accept_task = tokio::spawn(async move {
            let _ = listener.run().await;
        });

        Ok(Self {
            addr,
            registry,
            accept_task,
        })
    }

    /// Address clients should connect to.
    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    /// Direct registry access for assertions on server-side state.
    #[allow(dead_code)]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}
