//! Fuzz target: `UpdateService::poll` against hostile request streams.
//!
//! Decodes the input into a sequence of update requests and plays them at
//! the service.  The service must never panic and must never report a
//! bootable image, since no input can know the random nonce.
//!
//! cargo fuzz run fuzz_update_request

#![no_main]

use std::collections::VecDeque;

use dockclean::app::events::AppEvent;
use dockclean::app::ports::EventSink;
use dockclean::ota::codec::decode_request;
use dockclean::ota::transport::{TransportError, UpdateTransport};
use dockclean::ota::{PollOutcome, UpdateReply, UpdateRequest, UpdateService};
use libfuzzer_sys::fuzz_target;

struct Replay(VecDeque<UpdateRequest>);

impl UpdateTransport for Replay {
    fn try_recv(&mut self) -> Result<Option<UpdateRequest>, TransportError> {
        Ok(self.0.pop_front())
    }

    fn recv_timeout(&mut self, _timeout_ms: u32) -> Result<UpdateRequest, TransportError> {
        self.0.pop_front().ok_or(TransportError::Timeout)
    }

    fn send(&mut self, _reply: &UpdateReply) -> Result<(), TransportError> {
        Ok(())
    }

    fn close(&mut self) {}
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    // Requests are separated by a single length byte each.
    let mut requests = VecDeque::new();
    let mut rest = data;
    while let Some((&len, tail)) = rest.split_first() {
        let len = usize::from(len).min(tail.len());
        if let Ok(req) = decode_request(&tail[..len]) {
            requests.push_back(req);
        }
        rest = &tail[len..];
    }

    let mut svc = UpdateService::new("fuzz-password");
    let mut transport = Replay(requests);
    while !transport.0.is_empty() {
        let outcome = svc.poll(&mut transport, &mut Discard);
        assert_ne!(outcome, PollOutcome::RestartRequested);
    }
});
