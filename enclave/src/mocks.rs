//! Deterministic helpers for tests and loopback simulation.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use bytes::Bytes;
use commonware_cryptography::{ed25519::PrivateKey, Signer};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::channel::{ChannelError, SecureChannel};
use tombola_types::Identity;

/// Creates a deterministic client identity for tests.
pub fn create_client_identity(seed: u64) -> Identity {
    PrivateKey::from_seed(seed).public_key()
}

/// Creates a seeded draw RNG so test draws are reproducible.
pub fn create_draw_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Secure messaging channel stand-in that records every posted payload.
///
/// Clones share the same transcript, so a test can keep a handle after the
/// service (or actor) takes ownership of the channel. Flipping `set_fail`
/// exercises the channel-error paths.
#[derive(Clone, Default)]
pub struct MockChannel {
    sent: Arc<Mutex<Vec<(Identity, Bytes)>>>,
    fail: Arc<AtomicBool>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail (or succeed again).
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// The full transcript of posted payloads, in order.
    pub fn sent(&self) -> Vec<(Identity, Bytes)> {
        self.sent.lock().expect("mock channel poisoned").clone()
    }

    /// Text of the most recently posted payload.
    pub fn last_text(&self) -> Option<String> {
        self.sent
            .lock()
            .expect("mock channel poisoned")
            .last()
            .map(|(_, payload)| String::from_utf8_lossy(payload).into_owned())
    }
}

impl SecureChannel for MockChannel {
    fn send(&mut self, recipient: &Identity, payload: Bytes) -> Result<(), ChannelError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ChannelError::new("mock channel down"));
        }
        self.sent
            .lock()
            .expect("mock channel poisoned")
            .push((recipient.clone(), payload));
        Ok(())
    }
}
