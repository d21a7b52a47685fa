//! Process configuration.
//!
//! The relay's CLI surface is a single optional positional argument: the
//! TCP port to listen on. There are no flags and no config file.

/// Port used when none is given or the argument does not parse.
pub const DEFAULT_PORT: u16 = 9000;

/// Resolve the listen port from the process arguments (argv[0] excluded).
/// Missing or invalid values fall back to [`DEFAULT_PORT`] silently.
pub fn port_from_args<I>(mut args: I) -> u16
where
    I: Iterator<Item = String>,
{
    args.next()
        .and_then(|arg| arg.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}
