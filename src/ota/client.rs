//! Host-side end of the update channel.
//!
//! [`UpdateClient`] drives one upload over any byte stream: `Hello`,
//! answer the challenge, stream `Chunk`s and wait for each `Ack`, then
//! `Finish`.  The `dockclean-upload` binary wraps it around a TCP socket.

use core::fmt;
use std::io::{self, Read, Write};

use super::auth::compute_hmac;
use super::codec::{self, FrameDecoder, FrameError};
use super::{MAX_CHUNK_LEN, MAX_FIRMWARE_SIZE, UpdateErrorKind, UpdateReply, UpdateRequest};

#[derive(Debug)]
pub enum ClientError {
    Io(io::Error),
    Frame(FrameError),
    /// The device hung up mid-session.
    Closed,
    /// Image is empty or does not fit the update partition.
    ImageSize(usize),
    /// The device refused a message for the current session state.
    Denied,
    Failed(UpdateErrorKind),
    Unexpected(UpdateReply),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "i/o: {e}"),
            Self::Frame(e) => write!(f, "framing: {e}"),
            Self::Closed => write!(f, "device closed the connection"),
            Self::ImageSize(n) => write!(f, "image size {n} out of range"),
            Self::Denied => write!(f, "request denied"),
            Self::Failed(kind) => write!(f, "device reported {kind:?} failure"),
            Self::Unexpected(reply) => write!(f, "unexpected reply {reply:?}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<io::Error> for ClientError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<FrameError> for ClientError {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

pub struct UpdateClient<S> {
    stream: S,
    decoder: FrameDecoder,
    pending: Vec<u8>,
}

impl<S: Read + Write> UpdateClient<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            decoder: FrameDecoder::new(),
            pending: Vec::new(),
        }
    }

    /// Push `image` to the device.  `progress` sees `(written, total)`
    /// after every acknowledged chunk.
    pub fn upload(
        &mut self,
        image: &[u8],
        password: &[u8],
        mut progress: impl FnMut(u32, u32),
    ) -> Result<(), ClientError> {
        let total = u32::try_from(image.len())
            .ok()
            .filter(|&n| n > 0 && n <= MAX_FIRMWARE_SIZE)
            .ok_or(ClientError::ImageSize(image.len()))?;

        self.send(&UpdateRequest::Hello {
            image_size: total,
            sha256: hmac_sha256::Hash::hash(image),
        })?;
        let (session_id, nonce) = match self.recv()? {
            UpdateReply::Challenge { session_id, nonce } => (session_id, nonce),
            other => return Err(unexpected(other)),
        };

        self.send(&UpdateRequest::Auth {
            session_id,
            tag: compute_hmac(password, &nonce),
        })?;
        match self.recv()? {
            UpdateReply::Ready => {}
            other => return Err(unexpected(other)),
        }

        let mut offset = 0u32;
        for part in image.chunks(MAX_CHUNK_LEN) {
            self.send(&UpdateRequest::Chunk {
                offset,
                data: part.to_vec(),
            })?;
            offset += part.len() as u32;
            match self.recv()? {
                UpdateReply::Ack { written } if written == offset => progress(written, total),
                other => return Err(unexpected(other)),
            }
        }

        self.send(&UpdateRequest::Finish)?;
        match self.recv()? {
            UpdateReply::Done => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    fn send(&mut self, request: &UpdateRequest) -> Result<(), ClientError> {
        let frame = codec::encode_message(request)?;
        self.stream.write_all(&frame)?;
        self.stream.flush()?;
        Ok(())
    }

    fn recv(&mut self) -> Result<UpdateReply, ClientError> {
        loop {
            while !self.pending.is_empty() {
                let (used, frame) = self.decoder.feed(&self.pending)?;
                let reply = frame.map(codec::decode_reply).transpose()?;
                self.pending.drain(..used);
                if let Some(reply) = reply {
                    return Ok(reply);
                }
            }
            let mut buf = [0u8; 256];
            let n = self.stream.read(&mut buf)?;
            if n == 0 {
                return Err(ClientError::Closed);
            }
            self.pending.extend_from_slice(&buf[..n]);
        }
    }
}

fn unexpected(reply: UpdateReply) -> ClientError {
    match reply {
        UpdateReply::Denied => ClientError::Denied,
        UpdateReply::Failed { kind } => ClientError::Failed(kind),
        other => ClientError::Unexpected(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays canned device replies and records what the client wrote.
    struct Canned {
        replies: io::Cursor<Vec<u8>>,
        written: Vec<u8>,
    }

    impl Canned {
        fn new(replies: &[UpdateReply]) -> Self {
            let mut wire = Vec::new();
            for r in replies {
                wire.extend(codec::encode_message(r).unwrap());
            }
            Self {
                replies: io::Cursor::new(wire),
                written: Vec::new(),
            }
        }
    }

    impl Read for Canned {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.replies.read(buf)
        }
    }

    impl Write for Canned {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn empty_image_is_rejected_before_sending() {
        let mut c = UpdateClient::new(Canned::new(&[]));
        assert!(matches!(
            c.upload(&[], b"pw", |_, _| {}),
            Err(ClientError::ImageSize(0))
        ));
        assert!(c.stream.written.is_empty());
    }

    #[test]
    fn auth_failure_surfaces_kind() {
        let mut c = UpdateClient::new(Canned::new(&[
            UpdateReply::Challenge {
                session_id: 7,
                nonce: [3; 32],
            },
            UpdateReply::Failed {
                kind: UpdateErrorKind::Auth,
            },
        ]));
        assert!(matches!(
            c.upload(b"image", b"pw", |_, _| {}),
            Err(ClientError::Failed(UpdateErrorKind::Auth))
        ));
    }

    #[test]
    fn hangup_is_reported() {
        let mut c = UpdateClient::new(Canned::new(&[]));
        assert!(matches!(
            c.upload(b"image", b"pw", |_, _| {}),
            Err(ClientError::Closed)
        ));
    }

    #[test]
    fn full_session_reports_progress() {
        let mut c = UpdateClient::new(Canned::new(&[
            UpdateReply::Challenge {
                session_id: 1,
                nonce: [0; 32],
            },
            UpdateReply::Ready,
            UpdateReply::Ack { written: 5 },
            UpdateReply::Done,
        ]));
        let mut seen = Vec::new();
        c.upload(b"image", b"pw", |w, t| seen.push((w, t))).unwrap();
        assert_eq!(seen, vec![(5, 5)]);

        let mut dec = FrameDecoder::new();
        let (used, hello) = dec.feed(&c.stream.written).unwrap();
        assert!(used > 0);
        assert!(matches!(
            codec::decode_request(hello.unwrap()).unwrap(),
            UpdateRequest::Hello { image_size: 5, .. }
        ));
    }
}
