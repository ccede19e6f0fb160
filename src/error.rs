//! Small per-component error and outcome types.
//!
//! The teacher's codebase leans on plain `io::Result` at call sites and only
//! reaches for a dedicated enum when a caller needs to branch on more than
//! "it worked or it didn't". The same approach is used here: no `anyhow`,
//! no `thiserror`, just a handful of `Display`-able enums that mirror the
//! outcomes in the error handling table.

use std::fmt;

/// Outcome of framing a client request (C3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// The accumulated buffer is full but no complete request was found.
    BufferFull,
    /// A complete request line was seen but it has no usable method.
    UnknownProtocol,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::BufferFull => write!(f, "Request too large to handle"),
            FrameError::UnknownProtocol => write!(f, "unknown protocol"),
        }
    }
}

/// Outcome of classifying a request's target host (C4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKind {
    /// Plain hostname, to be resolved and connected to on port 80.
    Hostname(String),
    /// A literal `ip:port` target, already fully specified.
    IpLiteral { ip: String, port: u16 },
    /// The request asked for `host:443`; HTTPS is refused outright.
    Https,
}

/// Failure to resolve a hostname to an address (C6).
#[derive(Debug)]
pub enum ResolveError {
    Lookup(std::io::Error),
    NoAddress,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Lookup(e) => write!(f, "dns lookup failed: {e}"),
            ResolveError::NoAddress => write!(f, "dns lookup returned no address"),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Failure to reach the upstream origin (C7).
#[derive(Debug)]
pub struct ConnectError(pub std::io::Error);

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upstream connect failed: {}", self.0)
    }
}

impl std::error::Error for ConnectError {}

/// Failure loading the `KEY VALUE` configuration file.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
