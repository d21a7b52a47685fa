//! Test chat client.
//!
//! A plain line-oriented client that can drive the handshake and assert on
//! received lines.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A test chat client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl TestClient {
    /// Open a connection without performing the handshake.
    pub async fn connect(addr: SocketAddr) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }

    /// Connect, complete the username handshake, and consume the welcome
    /// traffic (prompt, welcome line, own join announcement).
    pub async fn register(addr: SocketAddr, name: &str) -> anyhow::Result<Self> {
        let mut client = Self::connect(addr).await?;
        let prompt = client.recv_line().await?;
        anyhow::ensure!(
            prompt.contains("Enter username:"),
            "unexpected prompt: {prompt}"
        );
        client.send_line(name).await?;
        client
            .recv_until_contains(&format!("Welcome, {name}!"))
            .await?;
        client
            .recv_until_contains(&format!("{name} has joined the chat."))
            .await?;
        Ok(client)
    }

    /// Send one line (newline appended).
    pub async fn send_line(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive one line, failing on timeout or EOF.
    pub async fn recv_line(&mut self) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(RECV_TIMEOUT, self.reader.read_line(&mut line)).await??;
        anyhow::ensure!(n > 0, "connection closed");
        Ok(line.trim_end().to_string())
    }

    /// True if the peer closes the stream instead of sending another line.
    #[allow(dead_code)]
    pub async fn recv_eof(&mut self) -> anyhow::Result<bool> {
        let mut line = String::new();
        let n = timeout(RECV_TIMEOUT, self.reader.read_line(&mut line)).await??;
        Ok(n == 0)
    }

    /// Read lines until one contains `needle`. Returns every line read, the
    /// matching one last, so callers can also assert on what else arrived
    /// from interleaved traffic.
    #[allow(dead_code)]
    pub async fn recv_until_contains(&mut self, needle: &str) -> anyhow::Result<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            let line = self.recv_line().await?;
            let done = line.contains(needle);
            lines.push(line);
            if done {
                return Ok(lines);
            }
        }
    }
}
