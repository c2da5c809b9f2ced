//! TCP transport for the firmware update channel.
//!
//! Implements [`UpdateTransport`] as a non-blocking, single-client TCP
//! server on `ota_port`.  `std::net` sits on lwIP under ESP-IDF, so the
//! same code runs on target and on the host.
//!
//! ## Connection model
//!
//! 1. `bind()` opens a non-blocking listener on `0.0.0.0:<port>`.
//! 2. `try_recv()` accepts a waiting client if none is connected, then
//!    reads whatever is available without blocking.
//! 3. `recv_timeout()` blocks on the client socket with a read timeout.
//! 4. A closed socket, an I/O error or a framing error drops the client;
//!    the listener keeps accepting.
//! 5. A client that sends nothing for the idle limit while `try_recv` is
//!    polling it is dropped, so a stalled or half-open connection cannot
//!    hold the only slot.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::ota::codec::{self, FrameDecoder};
use crate::ota::service::RECEIVE_TIMEOUT_MS;
use crate::ota::transport::{TransportError, UpdateTransport};
use crate::ota::{UpdateReply, UpdateRequest};

const READ_CHUNK: usize = 1024;

pub struct TcpUpdateTransport {
    listener: TcpListener,
    client: Option<TcpStream>,
    decoder: FrameDecoder,
    /// Received bytes not yet fed through the decoder.
    backlog: Vec<u8>,
    last_activity: Instant,
    idle_limit: Duration,
}

impl TcpUpdateTransport {
    /// Pass port `0` to let the OS pick (see [`local_addr`](Self::local_addr)).
    pub fn bind(port: u16) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port)))
            .map_err(|_| TransportError::Io)?;
        listener
            .set_nonblocking(true)
            .map_err(|_| TransportError::Io)?;
        info!("OTA: listening on port {}", port);
        Ok(Self {
            listener,
            client: None,
            decoder: FrameDecoder::new(),
            backlog: Vec::new(),
            last_activity: Instant::now(),
            idle_limit: Duration::from_millis(u64::from(RECEIVE_TIMEOUT_MS)),
        })
    }

    /// Override how long a polled client may stay silent before it is dropped.
    pub fn with_idle_limit(mut self, limit: Duration) -> Self {
        self.idle_limit = limit;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener.local_addr().map_err(|_| TransportError::Io)
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    fn accept(&mut self) {
        match self.listener.accept() {
            Ok((stream, addr)) => {
                if stream.set_nonblocking(true).is_err() {
                    warn!("OTA: failed to set non-blocking on client socket");
                    return;
                }
                info!("OTA: client connected from {}", addr);
                self.decoder.reset();
                self.backlog.clear();
                self.last_activity = Instant::now();
                self.client = Some(stream);
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => warn!("OTA: accept error: {}", e),
        }
    }

    /// Decode the next buffered request, if a whole frame is present.
    fn next_buffered(&mut self) -> Result<Option<UpdateRequest>, TransportError> {
        while !self.backlog.is_empty() {
            let decoded = match self.decoder.feed(&self.backlog) {
                Ok((used, frame)) => frame
                    .map(codec::decode_request)
                    .transpose()
                    .map(|req| (used, req)),
                Err(e) => Err(e),
            };
            let (used, request) = match decoded {
                Ok(d) => d,
                Err(e) => {
                    warn!("OTA: dropping client: {}", e);
                    self.close();
                    return Err(e.into());
                }
            };
            self.backlog.drain(..used);
            if request.is_some() {
                return Ok(request);
            }
        }
        Ok(None)
    }

    /// Read once from the client.  `None` wait means non-blocking.
    /// Returns whether any bytes arrived.
    fn fill(&mut self, wait: Option<Duration>) -> Result<bool, TransportError> {
        let Some(stream) = self.client.as_mut() else {
            return Err(TransportError::Disconnected);
        };
        let configured = match wait {
            None => stream.set_nonblocking(true),
            Some(d) => stream
                .set_nonblocking(false)
                .and_then(|()| stream.set_read_timeout(Some(d.max(Duration::from_millis(1))))),
        };
        if configured.is_err() {
            self.close();
            return Err(TransportError::Io);
        }

        let mut buf = [0u8; READ_CHUNK];
        match stream.read(&mut buf) {
            Ok(0) => {
                info!("OTA: client disconnected");
                self.close();
                Err(TransportError::Disconnected)
            }
            Ok(n) => {
                self.last_activity = Instant::now();
                self.backlog.extend_from_slice(&buf[..n]);
                Ok(true)
            }
            Err(ref e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                Ok(false)
            }
            Err(e) => {
                warn!("OTA: read error: {}", e);
                self.close();
                Err(TransportError::Io)
            }
        }
    }
}

impl UpdateTransport for TcpUpdateTransport {
    fn try_recv(&mut self) -> Result<Option<UpdateRequest>, TransportError> {
        if self.client.is_none() {
            self.accept();
            if self.client.is_none() {
                return Ok(None);
            }
        }
        if let Some(req) = self.next_buffered()? {
            return Ok(Some(req));
        }
        if self.fill(None)? {
            return self.next_buffered();
        }
        if self.last_activity.elapsed() > self.idle_limit {
            warn!(
                "OTA: dropping client idle for more than {} ms",
                self.idle_limit.as_millis()
            );
            self.close();
            return Err(TransportError::Disconnected);
        }
        Ok(None)
    }

    fn recv_timeout(&mut self, timeout_ms: u32) -> Result<UpdateRequest, TransportError> {
        let deadline = Instant::now() + Duration::from_millis(u64::from(timeout_ms));
        loop {
            if let Some(req) = self.next_buffered()? {
                return Ok(req);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(TransportError::Timeout);
            }
            self.fill(Some(remaining))?;
        }
    }

    fn send(&mut self, reply: &UpdateReply) -> Result<(), TransportError> {
        let frame = codec::encode_message(reply)?;
        let Some(stream) = self.client.as_mut() else {
            return Err(TransportError::Disconnected);
        };
        // Writes block even on a socket left non-blocking by try_recv.
        let written = stream
            .set_nonblocking(false)
            .and_then(|()| stream.write_all(&frame))
            .and_then(|()| stream.flush());
        if written.is_err() {
            self.close();
            return Err(TransportError::Io);
        }
        Ok(())
    }

    fn close(&mut self) {
        self.client = None;
        self.backlog.clear();
        self.decoder.reset();
    }
}
