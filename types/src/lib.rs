pub mod wire;
pub use wire::{DrawOutcome, HostCommand, Reply, Request, RequestError};

/// Authenticated caller identity, as established by the secure messaging
/// channel when it decrypts an inbound message.
pub type Identity = commonware_cryptography::ed25519::PublicKey;

/// Number of decimal digits in a ticket.
pub const TICKET_DIGITS: usize = 6;
