//! Secure messaging channel boundary.
//!
//! The channel substrate (mutual authentication, confidentiality,
//! attestation, delivery mechanics) lives outside the trusted core. The
//! service only requires "post this payload to that authenticated
//! identity"; inbound delivery is a call into
//! [`LotteryService::on_client_message`](crate::LotteryService::on_client_message).

use bytes::Bytes;
use thiserror::Error;
use tombola_types::Identity;

/// Failure reported by the channel collaborator when posting a reply.
///
/// The detail is opaque to the core; it is surfaced, never retried.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("channel send failed: {reason}")]
pub struct ChannelError {
    reason: String,
}

impl ChannelError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Outbound half of the secure messaging channel.
pub trait SecureChannel {
    /// Post an authenticated, confidential payload to `recipient`.
    fn send(&mut self, recipient: &Identity, payload: Bytes) -> Result<(), ChannelError>;
}
