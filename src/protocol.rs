//! Wire protocol: client command parsing and server line formatting.
//!
//! A line is the unit of a message: newline-delimited UTF-8 text with no
//! further framing. Command keywords are matched case-insensitively;
//! payloads (usernames, message text) are case-sensitive.

use crate::error::CommandError;

/// A parsed client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Graceful disconnect.
    Quit,
    /// Request the list of online usernames.
    List,
    /// Private message to a named user.
    Pm { to: String, text: String },
    /// Broadcast to everyone (explicit `MSG` or implicit bare line).
    Msg(String),
}

impl Command {
    /// Parse a trimmed, non-empty line into a command.
    ///
    /// A bare `PM` or `MSG` with no payload is not the keyword form and
    /// falls through to an implicit broadcast of the literal line. `PM`
    /// with a payload but no message text is malformed.
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        if line.eq_ignore_ascii_case("QUIT") {
            return Ok(Command::Quit);
        }
        if line.eq_ignore_ascii_case("LIST") {
            return Ok(Command::List);
        }
        if let Some(rest) = strip_keyword(line, "PM ") {
            // PM format: PM <user> <text>
            return match rest.split_once(' ') {
                Some((to, text)) if !to.is_empty() && !text.is_empty() => Ok(Command::Pm {
                    to: to.to_string(),
                    text: text.to_string(),
                }),
                _ => Err(CommandError::PmMissingArgs),
            };
        }
        if let Some(rest) = strip_keyword(line, "MSG ") {
            return Ok(Command::Msg(rest.to_string()));
        }
        Ok(Command::Msg(line.to_string()))
    }
}

/// Case-insensitive keyword prefix match, returning the payload after it.
fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let (head, rest) = line.split_at_checked(keyword.len())?;
    head.eq_ignore_ascii_case(keyword).then_some(rest)
}

/// `[SYSTEM] {text}` - system notices, prompts, and error replies.
pub fn system_line(text: &str) -> String {
    format!("[SYSTEM] {text}")
}

/// `{from}: {text}` - broadcast delivery.
pub fn broadcast_line(from: &str, text: &str) -> String {
    format!("{from}: {text}")
}

/// `[PM from {from}] {text}` - private message as seen by the recipient.
pub fn pm_from_line(from: &str, text: &str) -> String {
    format!("[PM from {from}] {text}")
}

/// `[PM to {to}] {text}` - private-message echo back to the sender.
pub fn pm_to_line(to: &str, text: &str) -> String {
    format!("[PM to {to}] {text}")
}
