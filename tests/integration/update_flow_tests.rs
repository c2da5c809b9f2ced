//! End-to-end update sessions over a loopback TCP socket.
//!
//! The device side (TcpUpdateTransport + UpdateService) runs on the test
//! thread exactly as the main loop polls it; the client runs on a helper
//! thread.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use crate::mock_hw::RecordingSink;

use dockclean::adapters::ota_tcp::TcpUpdateTransport;
use dockclean::app::events::AppEvent;
use dockclean::ota::auth::compute_hmac;
use dockclean::ota::client::UpdateClient;
use dockclean::ota::codec::{HEADER_SIZE, decode_reply, encode_message};
use dockclean::ota::{
    OtaState, PollOutcome, UpdateErrorKind, UpdateEvent, UpdateReply, UpdateRequest,
    UpdateService,
};

const PASSWORD: &str = "dock-update";

struct Client(TcpStream);

impl Client {
    fn connect(port: u16) -> Self {
        let stream = TcpStream::connect(SocketAddr::from(([127, 0, 0, 1], port))).unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
        Self(stream)
    }

    fn send(&mut self, req: &UpdateRequest) {
        self.0.write_all(&encode_message(req).unwrap()).unwrap();
    }

    fn recv(&mut self) -> Option<UpdateReply> {
        let mut header = [0u8; HEADER_SIZE];
        self.0.read_exact(&mut header).ok()?;
        let mut payload = vec![0u8; u32::from_le_bytes(header) as usize];
        self.0.read_exact(&mut payload).ok()?;
        decode_reply(&payload).ok()
    }

    /// Hello + Auth; returns the device's answer to Auth.
    fn handshake(&mut self, image: &[u8], password: &str) -> Option<UpdateReply> {
        self.send(&UpdateRequest::Hello {
            image_size: image.len() as u32,
            sha256: hmac_sha256::Hash::hash(image),
        });
        let Some(UpdateReply::Challenge { session_id, nonce }) = self.recv() else {
            panic!("expected challenge");
        };
        self.send(&UpdateRequest::Auth {
            session_id,
            tag: compute_hmac(password.as_bytes(), &nonce),
        });
        self.recv()
    }
}

fn serve_until_outcome(
    svc: &mut UpdateService,
    transport: &mut TcpUpdateTransport,
    sink: &mut RecordingSink,
) -> PollOutcome {
    for _ in 0..2_000 {
        match svc.poll(transport, sink) {
            PollOutcome::Idle | PollOutcome::Handled => thread::sleep(Duration::from_millis(2)),
            outcome => return outcome,
        }
    }
    panic!("update session never concluded");
}

fn update_events(sink: &RecordingSink) -> Vec<UpdateEvent> {
    sink.events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Update(u) => Some(*u),
            _ => None,
        })
        .collect()
}

#[test]
fn authenticated_upload_requests_restart() {
    let mut transport = TcpUpdateTransport::bind(0).unwrap();
    let port = transport.local_addr().unwrap().port();
    let mut svc = UpdateService::new(PASSWORD);
    let mut sink = RecordingSink::new();

    let image: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
    let client_image = image.clone();
    let client = thread::spawn(move || {
        let mut c = Client::connect(port);
        assert_eq!(c.handshake(&client_image, PASSWORD), Some(UpdateReply::Ready));
        let mut offset = 0u32;
        for part in client_image.chunks(4_000) {
            c.send(&UpdateRequest::Chunk {
                offset,
                data: part.to_vec(),
            });
            offset += part.len() as u32;
            assert_eq!(c.recv(), Some(UpdateReply::Ack { written: offset }));
        }
        c.send(&UpdateRequest::Finish);
        c.recv()
    });

    let outcome = serve_until_outcome(&mut svc, &mut transport, &mut sink);
    assert_eq!(client.join().unwrap(), Some(UpdateReply::Done));
    assert_eq!(outcome, PollOutcome::RestartRequested);
    assert_eq!(svc.manager().state(), OtaState::ReadyToReboot);

    let events = update_events(&sink);
    assert_eq!(events.first(), Some(&UpdateEvent::Started { image_size: 20_000 }));
    assert_eq!(events.last(), Some(&UpdateEvent::Completed));
}

#[test]
fn wrong_password_is_refused_and_listener_survives() {
    let mut transport = TcpUpdateTransport::bind(0).unwrap();
    let port = transport.local_addr().unwrap().port();
    let mut svc = UpdateService::new(PASSWORD);
    let mut sink = RecordingSink::new();

    let client = thread::spawn(move || {
        let mut c = Client::connect(port);
        let answer = c.handshake(b"firmware", "not-the-password");
        (answer, c.recv())
    });

    let outcome = serve_until_outcome(&mut svc, &mut transport, &mut sink);
    let (answer, after) = client.join().unwrap();
    assert_eq!(outcome, PollOutcome::Failed(UpdateErrorKind::Auth));
    assert_eq!(answer, Some(UpdateReply::Failed { kind: UpdateErrorKind::Auth }));
    assert_eq!(after, None, "device hangs up after a failed auth");
    assert_eq!(update_events(&sink), vec![UpdateEvent::Error(UpdateErrorKind::Auth)]);

    // A second client still gets a challenge.
    let client = thread::spawn(move || {
        let mut c = Client::connect(port);
        c.send(&UpdateRequest::Hello {
            image_size: 4,
            sha256: [0; 32],
        });
        c.recv()
    });
    let mut answered = false;
    for _ in 0..2_000 {
        if svc.poll(&mut transport, &mut sink) == PollOutcome::Handled {
            answered = true;
            break;
        }
        thread::sleep(Duration::from_millis(2));
    }
    assert!(answered);
    assert!(matches!(
        client.join().unwrap(),
        Some(UpdateReply::Challenge { .. })
    ));
}

#[test]
fn garbage_stream_drops_client() {
    let mut transport = TcpUpdateTransport::bind(0).unwrap();
    let port = transport.local_addr().unwrap().port();
    let mut svc = UpdateService::new(PASSWORD);
    let mut sink = RecordingSink::new();

    let client = thread::spawn(move || {
        let mut c = Client::connect(port);
        c.0.write_all(&u32::MAX.to_le_bytes()).unwrap();
        c.recv()
    });

    let outcome = serve_until_outcome(&mut svc, &mut transport, &mut sink);
    assert_eq!(outcome, PollOutcome::Failed(UpdateErrorKind::Connect));
    assert_eq!(client.join().unwrap(), None);
    assert!(!transport.is_connected());
}

#[test]
fn idle_listener_never_blocks() {
    let mut transport = TcpUpdateTransport::bind(0).unwrap();
    let mut svc = UpdateService::new(PASSWORD);
    let mut sink = RecordingSink::new();
    for _ in 0..100 {
        assert_eq!(svc.poll(&mut transport, &mut sink), PollOutcome::Idle);
    }
    assert!(sink.events.is_empty());
}

#[test]
fn silent_client_is_dropped_and_next_uploader_is_served() {
    let mut transport = TcpUpdateTransport::bind(0)
        .unwrap()
        .with_idle_limit(Duration::from_millis(200));
    let port = transport.local_addr().unwrap().port();
    let mut svc = UpdateService::new(PASSWORD);
    let mut sink = RecordingSink::new();

    // Connects, then never says a word.
    let _stalled = Client::connect(port);
    for _ in 0..500 {
        svc.poll(&mut transport, &mut sink);
        if transport.is_connected() {
            break;
        }
        thread::sleep(Duration::from_millis(2));
    }
    assert!(transport.is_connected());

    let uploader = thread::spawn(move || {
        let mut c = Client::connect(port);
        c.send(&UpdateRequest::Hello {
            image_size: 4,
            sha256: [0; 32],
        });
        c.recv()
    });

    let mut answered = false;
    for _ in 0..600 {
        if svc.poll(&mut transport, &mut sink) == PollOutcome::Handled {
            answered = true;
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }
    assert!(answered, "second uploader never served");
    assert!(matches!(
        uploader.join().unwrap(),
        Some(UpdateReply::Challenge { .. })
    ));
    assert!(update_events(&sink).is_empty());
}

#[test]
fn host_uploader_flashes_image() {
    let mut transport = TcpUpdateTransport::bind(0).unwrap();
    let port = transport.local_addr().unwrap().port();
    let mut svc = UpdateService::new(PASSWORD);
    let mut sink = RecordingSink::new();

    let image: Vec<u8> = (0..9_001u32).map(|i| (i * 7) as u8).collect();
    let client_image = image.clone();
    let uploader = thread::spawn(move || {
        let mut acks = Vec::new();
        let result = UpdateClient::new(Client::connect(port).0).upload(
            &client_image,
            PASSWORD.as_bytes(),
            |written, total| acks.push((written, total)),
        );
        (result.map_err(|e| e.to_string()), acks)
    });

    let outcome = serve_until_outcome(&mut svc, &mut transport, &mut sink);
    let (result, acks) = uploader.join().unwrap();
    assert_eq!(result, Ok(()));
    assert_eq!(acks, vec![(4_000, 9_001), (8_000, 9_001), (9_001, 9_001)]);
    assert_eq!(outcome, PollOutcome::RestartRequested);
    assert_eq!(svc.manager().state(), OtaState::ReadyToReboot);
}
