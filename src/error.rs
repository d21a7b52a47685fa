//! Unified error handling for relayd.

use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Errors that can end the username handshake.
///
/// None of these are fatal to the server; the connection is terminated and
/// the accept loop carries on.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// Peer closed the connection before completing the handshake.
    #[error("client disconnected during handshake")]
    Disconnected,

    /// Retry budget exhausted without an acceptable name.
    #[error("no acceptable username after {0} attempts")]
    AttemptsExhausted(u32),

    /// Read or write failure on the connection.
    #[error("i/o error during handshake: {0}")]
    Io(#[from] LinesCodecError),
}

/// Errors from parsing a client command line.
///
/// These get a single corrective reply; the connection stays open.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// `PM` without both a target and message text.
    #[error("invalid PM format")]
    PmMissingArgs,
}
