//! relayd - a line-oriented chat relay.

use relayd::config;
use relayd::listener::Listener;
use relayd::registry::Registry;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// How long shutdown waits for sessions to finish their cleanup.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let port = config::port_from_args(std::env::args().skip(1));
    info!(port, "Starting relayd");

    let registry = Arc::new(Registry::new());
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    let listener = Listener::bind(addr, Arc::clone(&registry)).await?;

    tokio::select! {
        // Only a bind/accept fault ends the loop; it is the one fatal
        // condition in the relay.
        result = listener.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received; closing sessions");
            registry.shutdown_all();
            // Give the session tasks a bounded window to write their QUIT
            // sentinels and unregister before the runtime tears them down.
            let drained = timeout(DRAIN_TIMEOUT, async {
                while !registry.is_empty() {
                    sleep(Duration::from_millis(10)).await;
                }
            })
            .await
            .is_ok();
            if !drained {
                info!(remaining = registry.len(), "Drain timeout; exiting anyway");
            }
            Ok(())
        }
    }
}
