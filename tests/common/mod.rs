//! Integration test common infrastructure.
//!
//! Provides an in-process relay instance on an ephemeral port plus a line
//! client with timeout-guarded reads.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::TestServer;
