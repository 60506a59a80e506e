//! Tombola lottery core.
//!
//! This crate contains the lottery state machine run inside the attested
//! environment: the ticket registry, the controller that routes client
//! requests and the host declare command, and the actor/mailbox ingress
//! that serializes inbound events.
//!
//! ## Determinism requirements
//! - Draw randomness comes only from the injected [`rand::Rng`].
//! - Iteration order of hash-based collections must not influence the draw;
//!   the registry keeps an ordered snapshot and samples by index.
//!
//! The primary entrypoint is [`LotteryService`]; deployments that need the
//! single-event-at-a-time discipline wrap it in an [`Actor`].

mod actor;
mod channel;
mod ingress;
mod registry;
mod service;

pub use actor::{Actor, Config};
pub use channel::{ChannelError, SecureChannel};
pub use ingress::{Mailbox, Message};
pub use registry::{RegisterOutcome, TicketError, TicketRegistry};
pub use service::{DrawStatus, HostError, LotteryService};

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
