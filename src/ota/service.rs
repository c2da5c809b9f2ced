//! Update service: drives one update session per client.
//!
//! Polled once per control-loop iteration.  While no session is
//! authenticated, [`UpdateService::poll`] never blocks.  Once the client
//! authenticates, the service stays inside `poll` receiving chunks until
//! the image is finished, aborted or fails; the dock loop is paused for
//! that time.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

use super::auth::Session;
use super::manager::OtaManager;
use super::transport::{TransportError, UpdateTransport};
use super::{UpdateErrorKind, UpdateEvent, UpdateReply, UpdateRequest};

/// Longest silence tolerated from a client, before or during a transfer.
pub const RECEIVE_TIMEOUT_MS: u32 = 5_000;

/// What one [`UpdateService::poll`] call amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing to do.
    Idle,
    /// A request was answered; the session continues.
    Handled,
    /// The client aborted the transfer.
    Aborted,
    Failed(UpdateErrorKind),
    /// A verified image is bootable; restart into it.
    RestartRequested,
}

/// Image announced by `Hello`, pending authentication.
#[derive(Debug, Clone, Copy)]
struct Announced {
    image_size: u32,
    sha256: [u8; 32],
}

pub struct UpdateService {
    session: Session,
    manager: OtaManager,
    password: heapless::String<64>,
    announced: Option<Announced>,
    progress_decile: u32,
}

impl UpdateService {
    pub fn new(password: &str) -> Self {
        let mut pw = heapless::String::new();
        for c in password.chars() {
            if pw.push(c).is_err() {
                break;
            }
        }
        Self {
            session: Session::new(),
            manager: OtaManager::new(),
            password: pw,
            announced: None,
            progress_decile: 0,
        }
    }

    pub fn manager(&self) -> &OtaManager {
        &self.manager
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn poll(
        &mut self,
        transport: &mut impl UpdateTransport,
        sink: &mut impl EventSink,
    ) -> PollOutcome {
        let request = match transport.try_recv() {
            Ok(Some(req)) => req,
            Ok(None) => return PollOutcome::Idle,
            Err(TransportError::Disconnected) => {
                self.reset_session();
                return PollOutcome::Idle;
            }
            Err(e) => {
                warn!("OTA: handshake receive failed: {}", e);
                return self.fail(UpdateErrorKind::Connect, transport, sink);
            }
        };

        match request {
            UpdateRequest::Hello { image_size, sha256 } => {
                self.manager.abort();
                self.announced = Some(Announced { image_size, sha256 });
                let (session_id, nonce) = self.session.begin_challenge();
                info!("OTA: hello ({} bytes), challenge issued", image_size);
                self.reply(transport, &UpdateReply::Challenge { session_id, nonce })
            }
            UpdateRequest::Auth { session_id, tag } => {
                let Some(image) = self.announced else {
                    return self.deny(transport);
                };
                if !self
                    .session
                    .verify_response(session_id, &tag, self.password.as_bytes())
                {
                    return self.fail(UpdateErrorKind::Auth, transport, sink);
                }
                if let Err(e) = self.manager.begin(image.image_size, &image.sha256) {
                    warn!("OTA: begin refused: {}", e);
                    return self.fail(UpdateErrorKind::Begin, transport, sink);
                }
                self.progress_decile = 0;
                sink.emit(&AppEvent::Update(UpdateEvent::Started {
                    image_size: image.image_size,
                }));
                if self.reply(transport, &UpdateReply::Ready) != PollOutcome::Handled {
                    return self.fail(UpdateErrorKind::Connect, transport, sink);
                }
                self.receive(image.image_size, transport, sink)
            }
            UpdateRequest::Abort => {
                self.reset_session();
                PollOutcome::Aborted
            }
            UpdateRequest::Chunk { .. } | UpdateRequest::Finish => self.deny(transport),
        }
    }

    // ── Authenticated transfer ────────────────────────────────

    fn receive(
        &mut self,
        total: u32,
        transport: &mut impl UpdateTransport,
        sink: &mut impl EventSink,
    ) -> PollOutcome {
        loop {
            let request = match transport.recv_timeout(RECEIVE_TIMEOUT_MS) {
                Ok(req) => req,
                Err(e) => {
                    warn!("OTA: receive failed: {}", e);
                    return self.fail(UpdateErrorKind::Receive, transport, sink);
                }
            };

            match request {
                UpdateRequest::Chunk { offset, data } => {
                    match self.manager.write_chunk(offset, &data) {
                        Ok(written) => {
                            self.report_progress(written, total, sink);
                            if transport.send(&UpdateReply::Ack { written }).is_err() {
                                return self.fail(UpdateErrorKind::Receive, transport, sink);
                            }
                        }
                        Err(e) => {
                            warn!("OTA: chunk at {} rejected: {}", offset, e);
                            return self.fail(UpdateErrorKind::Receive, transport, sink);
                        }
                    }
                }
                UpdateRequest::Finish => {
                    if let Err(e) = self.manager.finalize() {
                        warn!("OTA: finalize failed: {}", e);
                        return self.fail(UpdateErrorKind::End, transport, sink);
                    }
                    // The image is already bootable; a lost Done does not matter.
                    let _ = transport.send(&UpdateReply::Done);
                    sink.emit(&AppEvent::Update(UpdateEvent::Completed));
                    self.session.reset();
                    self.announced = None;
                    return PollOutcome::RestartRequested;
                }
                UpdateRequest::Abort => {
                    self.reset_session();
                    return PollOutcome::Aborted;
                }
                UpdateRequest::Hello { .. } | UpdateRequest::Auth { .. } => {
                    warn!("OTA: handshake message during transfer");
                    return self.fail(UpdateErrorKind::Receive, transport, sink);
                }
            }
        }
    }

    /// Emit `Progress` at most once per 10 % of the image.
    fn report_progress(&mut self, written: u32, total: u32, sink: &mut impl EventSink) {
        let decile = (u64::from(written) * 10 / u64::from(total.max(1))) as u32;
        if decile > self.progress_decile {
            self.progress_decile = decile;
            sink.emit(&AppEvent::Update(UpdateEvent::Progress { written, total }));
        }
    }

    // ── Helpers ───────────────────────────────────────────────

    fn reply(&mut self, transport: &mut impl UpdateTransport, reply: &UpdateReply) -> PollOutcome {
        match transport.send(reply) {
            Ok(()) => PollOutcome::Handled,
            Err(e) => {
                warn!("OTA: send failed: {}", e);
                self.reset_session();
                transport.close();
                PollOutcome::Idle
            }
        }
    }

    fn deny(&mut self, transport: &mut impl UpdateTransport) -> PollOutcome {
        warn!("OTA: request refused, session not authenticated");
        self.reply(transport, &UpdateReply::Denied)
    }

    fn fail(
        &mut self,
        kind: UpdateErrorKind,
        transport: &mut impl UpdateTransport,
        sink: &mut impl EventSink,
    ) -> PollOutcome {
        let _ = transport.send(&UpdateReply::Failed { kind });
        transport.close();
        self.reset_session();
        sink.emit(&AppEvent::Update(UpdateEvent::Error(kind)));
        PollOutcome::Failed(kind)
    }

    fn reset_session(&mut self) {
        self.manager.abort();
        self.session.reset();
        self.announced = None;
    }
}
