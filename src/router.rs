//! The Router - fan-out of broadcast, private, and system lines.
//!
//! Every delivery walks a snapshot of the Registry taken at call start;
//! sessions that register or leave mid-delivery may miss that particular
//! line, which is the accepted best-effort semantic. Sends never await:
//! each target's handle enqueues onto that session's own writer queue, so
//! no registry iteration spans a suspension point.

use crate::protocol;
use crate::registry::Registry;
use std::sync::Arc;
use tracing::debug;

/// Routes messages between registered sessions.
#[derive(Clone)]
pub struct Router {
    registry: Arc<Registry>,
}

impl Router {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Deliver `{from}: {text}` to every registered session, the sender
    /// included, so the sender's view of ordering matches everyone else's.
    pub fn broadcast(&self, from: &str, text: &str) {
        self.fan_out(protocol::broadcast_line(from, text));
    }

    /// Deliver `[SYSTEM] {text}` to every registered session. Used for
    /// join and leave notices.
    pub fn announce(&self, text: &str) {
        self.fan_out(protocol::system_line(text));
    }

    /// Deliver a private message, echoing a confirmation to the sender.
    ///
    /// Returns whether the recipient was found. When it is not, the sender
    /// (if still registered) gets a system notice naming the unknown user
    /// instead, and nothing is sent to anyone else. The confirmation echo
    /// is skipped silently if the sender's own entry is already gone, as
    /// happens in a mid-disconnect race.
    pub fn private_message(&self, from: &str, to: &str, text: &str) -> bool {
        match self.registry.lookup(to) {
            Some(recipient) => {
                recipient.send(protocol::pm_from_line(from, text));
                if let Some(sender) = self.registry.lookup(from) {
                    sender.send(protocol::pm_to_line(to, text));
                }
                true
            }
            None => {
                debug!(from = %from, to = %to, "PM recipient not found");
                if let Some(sender) = self.registry.lookup(from) {
                    sender.send(protocol::system_line(&format!("User '{to}' not found.")));
                }
                false
            }
        }
    }

    fn fan_out(&self, line: String) {
        for handle in self.registry.handles() {
            handle.send(line.clone());
        }
    }
}
