//! Length-prefix frame codec for update messages.
//!
//! Wire format:
//! ```text
//! ┌────────────┬──────────────────────────┐
//! │ Length (4B)│ postcard payload (N B)   │
//! │ LE u32     │                          │
//! └────────────┴──────────────────────────┘
//! ```
//!
//! The decoder accumulates incoming bytes and yields complete frames.
//! This handles partial reads gracefully; a single socket read may
//! return part of the header, part of the payload, or several frames
//! concatenated.

use core::fmt;

use serde::Serialize;

use super::{UpdateReply, UpdateRequest};

/// Maximum frame payload size (protects against memory exhaustion).
pub const MAX_FRAME_SIZE: usize = 4096;

/// Frame header size (4-byte little-endian length).
pub const HEADER_SIZE: usize = 4;

// ── Error type ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Header announced a zero-length or oversized payload.
    InvalidLength(u32),
    /// Payload does not decode as the expected message.
    Malformed,
    /// Encoded message exceeds [`MAX_FRAME_SIZE`].
    TooLarge,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength(n) => write!(f, "invalid frame length {}", n),
            Self::Malformed => write!(f, "malformed frame payload"),
            Self::TooLarge => write!(f, "message exceeds {} bytes", MAX_FRAME_SIZE),
        }
    }
}

// ── Decoder ───────────────────────────────────────────────────

enum DecoderState {
    ReadingHeader { collected: usize },
    ReadingPayload { expected: usize, collected: usize },
}

/// Streaming frame decoder.
pub struct FrameDecoder {
    state: DecoderState,
    header_buf: [u8; HEADER_SIZE],
    payload_buf: Box<[u8; MAX_FRAME_SIZE]>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::ReadingHeader { collected: 0 },
            header_buf: [0; HEADER_SIZE],
            payload_buf: Box::new([0; MAX_FRAME_SIZE]),
        }
    }

    /// Feed bytes into the decoder.
    ///
    /// Returns how many bytes of `data` were consumed and, once a frame
    /// completes, its payload.  Consumption stops right after a complete
    /// frame; feed the remainder again.  An invalid header resets the
    /// decoder and reports the error; the stream is out of sync after that.
    pub fn feed(&mut self, data: &[u8]) -> Result<(usize, Option<&[u8]>), FrameError> {
        let mut offset = 0;

        while offset < data.len() {
            match &mut self.state {
                DecoderState::ReadingHeader { collected } => {
                    let to_copy = (HEADER_SIZE - *collected).min(data.len() - offset);
                    self.header_buf[*collected..*collected + to_copy]
                        .copy_from_slice(&data[offset..offset + to_copy]);
                    *collected += to_copy;
                    offset += to_copy;

                    if *collected == HEADER_SIZE {
                        let announced = u32::from_le_bytes(self.header_buf);
                        let expected = announced as usize;
                        if expected == 0 || expected > MAX_FRAME_SIZE {
                            self.reset();
                            return Err(FrameError::InvalidLength(announced));
                        }
                        self.state = DecoderState::ReadingPayload {
                            expected,
                            collected: 0,
                        };
                    }
                }

                DecoderState::ReadingPayload { expected, collected } => {
                    let to_copy = (*expected - *collected).min(data.len() - offset);
                    self.payload_buf[*collected..*collected + to_copy]
                        .copy_from_slice(&data[offset..offset + to_copy]);
                    *collected += to_copy;
                    offset += to_copy;

                    if *collected == *expected {
                        let len = *expected;
                        self.state = DecoderState::ReadingHeader { collected: 0 };
                        return Ok((offset, Some(&self.payload_buf[..len])));
                    }
                }
            }
        }

        Ok((offset, None))
    }

    /// Reset decoder state (e.g. after the client reconnects).
    pub fn reset(&mut self) {
        self.state = DecoderState::ReadingHeader { collected: 0 };
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

// ── Encoding ──────────────────────────────────────────────────

/// Write `[LE-u32 length][payload]` into `out_buf`.
/// Returns the total number of bytes written.
pub fn encode_frame(payload: &[u8], out_buf: &mut [u8]) -> Option<usize> {
    let total = HEADER_SIZE + payload.len();
    if total > out_buf.len() || payload.is_empty() || payload.len() > MAX_FRAME_SIZE {
        return None;
    }

    let len_bytes = (payload.len() as u32).to_le_bytes();
    out_buf[..HEADER_SIZE].copy_from_slice(&len_bytes);
    out_buf[HEADER_SIZE..total].copy_from_slice(payload);
    Some(total)
}

/// Serialize `msg` with postcard and wrap it in a frame.
pub fn encode_message<T: Serialize>(msg: &T) -> Result<Vec<u8>, FrameError> {
    let payload = postcard::to_allocvec(msg).map_err(|_| FrameError::Malformed)?;
    let mut out = vec![0u8; HEADER_SIZE + payload.len()];
    encode_frame(&payload, &mut out).ok_or(FrameError::TooLarge)?;
    Ok(out)
}

pub fn decode_request(payload: &[u8]) -> Result<UpdateRequest, FrameError> {
    postcard::from_bytes(payload).map_err(|_| FrameError::Malformed)
}

pub fn decode_reply(payload: &[u8]) -> Result<UpdateReply, FrameError> {
    postcard::from_bytes(payload).map_err(|_| FrameError::Malformed)
}
