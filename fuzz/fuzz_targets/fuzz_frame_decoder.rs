//! Fuzz target: `FrameDecoder::feed`
//!
//! Drives arbitrary byte sequences into the streaming frame decoder the
//! way the TCP transport does (feed, drop consumed bytes, repeat) and
//! asserts that it never panics, never over-consumes and never yields an
//! out-of-bounds payload.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use dockclean::ota::codec::{FrameDecoder, MAX_FRAME_SIZE, decode_request};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = FrameDecoder::new();
    let mut rest = data;

    while !rest.is_empty() {
        let Ok((used, frame)) = decoder.feed(rest) else {
            break;
        };
        assert!(used > 0 && used <= rest.len(), "decoder must make progress");
        if let Some(payload) = frame {
            assert!(!payload.is_empty() && payload.len() <= MAX_FRAME_SIZE);
            let _ = decode_request(payload);
        }
        rest = &rest[used..];
    }

    // After a reset the decoder must accept bytes cleanly again.
    decoder.reset();
    let _ = decoder.feed(data);
});
