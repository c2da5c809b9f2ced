//! Update session authentication: challenge-response with HMAC-SHA256.
//!
//! 1. Client sends `Hello`
//! 2. Device replies with `Challenge { session_id, nonce }`
//! 3. Client computes `HMAC-SHA256(password, nonce)` and sends `Auth`
//! 4. Device verifies the HMAC and transitions to `Authenticated`
//!
//! Crypto is handled by the `hmac-sha256` crate: pure Rust, no_std,
//! constant-time verification, identical on ESP-IDF and host targets.

use log::warn;

/// Authentication state of the update session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Challenged { nonce: [u8; 32], session_id: u32 },
    Authenticated { session_id: u32 },
}

/// Tracks the single update client through the auth handshake.
pub struct Session {
    pub state: SessionState,
    next_session_id: u32,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Unauthenticated,
            next_session_id: 1,
        }
    }

    /// Begin the challenge-response handshake.  A repeated call replaces
    /// the outstanding challenge.
    pub fn begin_challenge(&mut self) -> (u32, [u8; 32]) {
        let session_id = self.alloc_session_id();
        let nonce = fill_random_nonce();

        self.state = SessionState::Challenged { nonce, session_id };
        (session_id, nonce)
    }

    /// Verify the client's tag against the stored nonce.
    ///
    /// Transitions to `Authenticated` on success; resets to
    /// `Unauthenticated` on failure.
    pub fn verify_response(&mut self, session_id: u32, tag: &[u8; 32], password: &[u8]) -> bool {
        let SessionState::Challenged {
            nonce,
            session_id: expected_session_id,
        } = self.state
        else {
            warn!("auth: verify_response called outside Challenged state");
            return false;
        };

        if session_id != expected_session_id {
            warn!("auth: session_id mismatch (got {session_id}, expected {expected_session_id})");
            self.reset();
            return false;
        }

        if !hmac_sha256::HMAC::verify(nonce, password, tag) {
            warn!("auth: HMAC verification failed");
            self.reset();
            return false;
        }

        self.state = SessionState::Authenticated { session_id };
        true
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated { .. })
    }

    pub fn reset(&mut self) {
        self.state = SessionState::Unauthenticated;
    }

    fn alloc_session_id(&mut self) -> u32 {
        let id = self.next_session_id;
        self.next_session_id = self.next_session_id.wrapping_add(1);
        id
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

// ── Client side ──────────────────────────────────────────────

/// Compute `HMAC-SHA256(password, nonce)`, the client half of the handshake.
pub fn compute_hmac(password: &[u8], nonce: &[u8; 32]) -> [u8; 32] {
    hmac_sha256::HMAC::mac(*nonce, password)
}

// ── Platform-specific nonce generation ───────────────────────

/// ESP-IDF: delegates to the hardware RNG via `esp_fill_random`.
#[cfg(target_os = "espidf")]
fn fill_random_nonce() -> [u8; 32] {
    let mut buf = [0u8; 32];
    // SAFETY: esp_fill_random writes to the provided buffer using
    // the hardware RNG. Buffer is valid and exclusively owned.
    unsafe {
        esp_idf_svc::sys::esp_fill_random(buf.as_mut_ptr().cast(), buf.len());
    }
    buf
}

/// Simulation stub: uses `RandomState` to produce non-cryptographic entropy.
#[cfg(not(target_os = "espidf"))]
fn fill_random_nonce() -> [u8; 32] {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let mut buf = [0u8; 32];
    for chunk in buf.chunks_mut(8) {
        let val = RandomState::new().build_hasher().finish().to_le_bytes();
        chunk.copy_from_slice(&val[..chunk.len()]);
    }
    buf
}
