//! Authenticated over-the-air firmware updates.
//!
//! ```text
//!  client                         device
//!    │ Hello{size, sha256} ───────▶ │
//!    │ ◀─────── Challenge{id, nonce} │
//!    │ Auth{id, HMAC(pw, nonce)} ─▶ │  OtaManager::begin
//!    │ ◀──────────────────── Ready   │
//!    │ Chunk{offset, data} ───────▶ │  × N, each acked
//!    │ Finish ────────────────────▶ │  SHA-256 check, set boot partition
//!    │ ◀───────────────────── Done   │  restart
//! ```
//!
//! Frames are `[LE u32 length][postcard payload]` (see [`codec`]).

pub mod auth;
#[cfg(not(target_os = "espidf"))]
pub mod client;
pub mod codec;
pub mod manager;
pub mod service;
pub mod transport;

use serde::{Deserialize, Serialize};

pub use manager::{OtaError, OtaManager, OtaState};
pub use service::{PollOutcome, UpdateService};

/// Largest image the update partition accepts.
pub const MAX_FIRMWARE_SIZE: u32 = 4 * 1024 * 1024;

/// Largest `Chunk` payload that still fits one frame.
pub const MAX_CHUNK_LEN: usize = 4000;

// ── Wire messages ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateRequest {
    Hello { image_size: u32, sha256: [u8; 32] },
    Auth { session_id: u32, tag: [u8; 32] },
    Chunk { offset: u32, data: Vec<u8> },
    Finish,
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateReply {
    Challenge { session_id: u32, nonce: [u8; 32] },
    Ready,
    Ack { written: u32 },
    Done,
    Denied,
    Failed { kind: UpdateErrorKind },
}

// ── Events ────────────────────────────────────────────────────

/// Which stage of an update failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateErrorKind {
    Auth,
    Begin,
    Connect,
    Receive,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateEvent {
    Started { image_size: u32 },
    Progress { written: u32, total: u32 },
    Error(UpdateErrorKind),
    Completed,
}
