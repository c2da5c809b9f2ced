//! Transport abstraction for the update channel.
//!
//! The firmware serves updates over a TCP socket
//! ([`crate::adapters::ota_tcp::TcpUpdateTransport`]); tests script their own.
//!
//! The [`UpdateService`](super::UpdateService) is generic over
//! [`UpdateTransport`], so adding a new transport requires zero changes to
//! the update logic.

use core::fmt;

use super::codec::FrameError;
use super::{UpdateReply, UpdateRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// No client, or the client went away.
    Disconnected,
    /// Nothing arrived within the receive timeout.
    Timeout,
    /// Socket-level failure.
    Io,
    /// The byte stream did not decode.
    Frame(FrameError),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "client disconnected"),
            Self::Timeout => write!(f, "receive timed out"),
            Self::Io => write!(f, "socket I/O error"),
            Self::Frame(e) => write!(f, "framing: {}", e),
        }
    }
}

impl From<FrameError> for TransportError {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

/// Message-oriented channel to at most one update client.
pub trait UpdateTransport {
    /// Non-blocking: return a complete request if one is buffered or
    /// readable right now.
    fn try_recv(&mut self) -> Result<Option<UpdateRequest>, TransportError>;

    /// Block up to `timeout_ms` for the next request.
    fn recv_timeout(&mut self, timeout_ms: u32) -> Result<UpdateRequest, TransportError>;

    fn send(&mut self, reply: &UpdateReply) -> Result<(), TransportError>;

    /// Drop the current client, if any.
    fn close(&mut self);
}
