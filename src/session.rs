//! Session - one client connection.
//!
//! Each session runs in its own tokio task:
//!
//! Phase 1: username handshake (sequential read/write against the Registry).
//! Phase 2: unified loop via `tokio::select!` over the framed reader and the
//! session's outgoing queue.
//!
//! Only this task ever touches the socket. Deliveries routed from other
//! sessions go through the queue and are written one at a time, so
//! interleaved broadcasts never corrupt a line on the wire.

use crate::error::{CommandError, HandshakeError};
use crate::protocol::{self, Command};
use crate::registry::Registry;
use crate::router::Router;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::{debug, info, instrument, warn};

/// Maximum accepted line length, in bytes.
const MAX_LINE_LEN: usize = 1024;

/// Outgoing queue capacity per session.
const OUTGOING_QUEUE: usize = 64;

/// Failed handshake attempts before the connection is dropped.
const MAX_NAME_ATTEMPTS: u32 = 3;

/// A line or control message queued for a session's writer.
#[derive(Debug)]
pub enum Outgoing {
    /// A complete wire line to deliver to the peer.
    Line(String),
    /// Terminate the session after a best-effort `QUIT` sentinel.
    Shutdown,
}

/// Cloneable, non-owning reference to a session, held by the Registry.
///
/// A handle can only enqueue; the session task keeps exclusive ownership of
/// the socket and its username. Sends are best-effort: failure to deliver
/// to one recipient never affects delivery to others or the sender's own
/// loop.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    tx: mpsc::Sender<Outgoing>,
    alive: Arc<AtomicBool>,
}

impl SessionHandle {
    pub fn new(tx: mpsc::Sender<Outgoing>) -> Self {
        Self {
            tx,
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Queue a line for delivery. Failures (session gone, queue full) are
    /// swallowed; a slow or dead peer must not stall the sender.
    pub fn send(&self, line: String) {
        if !self.alive.load(Ordering::Acquire) {
            return;
        }
        if let Err(e) = self.tx.try_send(Outgoing::Line(line)) {
            debug!(error = %e, "Dropped outgoing line");
        }
    }

    /// Best-effort termination request. Safe to invoke more than once.
    pub fn shutdown(&self) {
        let _ = self.tx.try_send(Outgoing::Shutdown);
    }

    /// Whether the owning session task is still running its loop.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    fn mark_dead(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

type Reader = FramedRead<OwnedReadHalf, LinesCodec>;
type Writer = FramedWrite<OwnedWriteHalf, LinesCodec>;

/// A client connection handler.
pub struct Session {
    addr: SocketAddr,
    stream: TcpStream,
    registry: Arc<Registry>,
    router: Router,
}

impl Session {
    pub fn new(stream: TcpStream, addr: SocketAddr, registry: Arc<Registry>) -> Self {
        let router = Router::new(Arc::clone(&registry));
        Self {
            addr,
            stream,
            registry,
            router,
        }
    }

    /// Run the connection to completion: handshake, read loop, cleanup.
    #[instrument(skip(self), fields(addr = %self.addr), name = "session")]
    pub async fn run(self) -> anyhow::Result<()> {
        info!("Client connected");

        let Session {
            stream,
            registry,
            router,
            ..
        } = self;
        let (read_half, write_half) = stream.into_split();
        let mut reader: Reader =
            FramedRead::new(read_half, LinesCodec::new_with_max_length(MAX_LINE_LEN));
        let mut writer: Writer =
            FramedWrite::new(write_half, LinesCodec::new_with_max_length(MAX_LINE_LEN));

        let (tx, mut outgoing_rx) = mpsc::channel(OUTGOING_QUEUE);
        let handle = SessionHandle::new(tx);

        // Phase 1: the username is registered atomically as part of the
        // availability check inside the handshake.
        let name = match handshake(&mut reader, &mut writer, &registry, &handle).await {
            Ok(name) => name,
            Err(e) => {
                handle.mark_dead();
                debug!(error = %e, "Handshake failed");
                return Ok(());
            }
        };

        info!(name = %name, "Client registered");
        let _ = writer
            .send(protocol::system_line(&format!("Welcome, {name}!")))
            .await;
        router.announce(&format!("{name} has joined the chat."));

        // Phase 2: unified loop over incoming lines and routed deliveries.
        // Direct replies are written here as well, so every outgoing line
        // for this client goes through the one writer in this one task.
        loop {
            tokio::select! {
                incoming = reader.next() => match incoming {
                    Some(Ok(raw)) => {
                        let line = raw.trim();
                        if line.is_empty() {
                            continue;
                        }
                        match Command::parse(line) {
                            Ok(Command::Quit) => {
                                let _ = writer.send(protocol::system_line("Goodbye!")).await;
                                break;
                            }
                            Ok(Command::List) => {
                                let users = registry.names().join(", ");
                                let reply =
                                    protocol::system_line(&format!("Connected users: {users}"));
                                if writer.send(reply).await.is_err() {
                                    break;
                                }
                            }
                            Ok(Command::Pm { to, text }) => {
                                router.private_message(&name, &to, &text);
                            }
                            Ok(Command::Msg(text)) => {
                                router.broadcast(&name, &text);
                            }
                            Err(CommandError::PmMissingArgs) => {
                                let usage = protocol::system_line(
                                    "Invalid PM format. Use: PM <user> <message>",
                                );
                                if writer.send(usage).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Err(e)) => {
                        warn!(name = %name, error = %e, "Read error");
                        break;
                    }
                    None => {
                        debug!(name = %name, "Client closed the connection");
                        break;
                    }
                },
                Some(out) = outgoing_rx.recv() => match out {
                    Outgoing::Line(line) => {
                        if let Err(e) = writer.send(line).await {
                            warn!(name = %name, error = %e, "Write error");
                            break;
                        }
                    }
                    Outgoing::Shutdown => {
                        let _ = writer.send("QUIT".to_string()).await;
                        break;
                    }
                },
            }
        }

        // Cleanup, reachable from every exit of the loop. Marking the
        // handle dead first stops late fan-outs from queueing into a writer
        // that will never drain. A session that never registered must not
        // produce a departure announcement; `unregister` reporting an
        // actual removal is what gates it.
        handle.mark_dead();
        if registry.unregister(&name) {
            router.announce(&format!("{name} has left the chat."));
        }
        info!(name = %name, "Client disconnected");

        Ok(())
    }
}

/// Prompt for and register a unique username, re-prompting on an empty or
/// taken name up to `MAX_NAME_ATTEMPTS` failures. Registration happens
/// inside the availability check, so two simultaneous handshakes for one
/// name cannot both pass.
async fn handshake(
    reader: &mut Reader,
    writer: &mut Writer,
    registry: &Registry,
    handle: &SessionHandle,
) -> Result<String, HandshakeError> {
    writer.send(protocol::system_line("Enter username:")).await?;

    for attempt in 1..=MAX_NAME_ATTEMPTS {
        let line = match reader.next().await {
            Some(line) => line?,
            None => return Err(HandshakeError::Disconnected),
        };
        let name = line.trim();

        if !name.is_empty() && registry.register(name, handle.clone()) {
            return Ok(name.to_string());
        }

        if attempt == MAX_NAME_ATTEMPTS {
            let _ = writer
                .send(protocol::system_line(
                    "Username already taken. Disconnecting.",
                ))
                .await;
            break;
        }
        writer
            .send(protocol::system_line(
                "Username already taken. Enter a different username:",
            ))
            .await?;
    }

    Err(HandshakeError::AttemptsExhausted(MAX_NAME_ATTEMPTS))
}
