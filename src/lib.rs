//! relayd - a line-oriented chat relay.
//!
//! Clients connect over plain TCP, register a unique display name, and
//! exchange broadcast or private messages through this central relay
//! process. One tokio task per connection, a [`registry::Registry`] as the
//! single piece of cross-task shared state, and a [`router::Router`] that
//! fans lines out to a snapshot of the registered sessions.

pub mod config;
pub mod error;
pub mod listener;
pub mod protocol;
pub mod registry;
pub mod router;
pub mod session;
