//! Lottery controller: routes inbound client requests to registration or
//! result-query handling and performs the draw when commanded by the host.

use bytes::Bytes;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::channel::{ChannelError, SecureChannel};
use crate::registry::{RegisterOutcome, TicketRegistry};
use tombola_types::{
    wire::{DrawOutcome, HostCommand, Reply, Request, RequestError},
    Identity,
};

/// Draw result lifecycle. `Undeclared -> Declared` is one-way and one-shot,
/// driven solely by the host command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawStatus {
    Undeclared,
    Declared(u32),
}

/// Failure surfaced on the host command channel. Unlike client-facing
/// errors, these are integration faults and are not answered with a reply.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    /// The host payload was not the literal `DECLARE` token.
    #[error("unexpected host command: {payload:?}")]
    UnexpectedCommand { payload: Vec<u8> },
    /// A declare arrived before any client message established a recipient.
    #[error("no known recipient: no client message has been processed")]
    NoKnownRecipient,
    /// The outcome could not be delivered to the last sender.
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// The lottery state machine.
///
/// Owns the ticket registry, the draw status, and the identity of the most
/// recent client sender. All mutation goes through [`Self::on_client_message`]
/// and [`Self::on_host_command`]; wrapping the service in an
/// [`Actor`](crate::Actor) guarantees the two never interleave.
///
/// Replies are addressed to the sender of the specific triggering request.
/// The host-declare outcome is addressed to the most recent sender
/// (last-writer-wins).
pub struct LotteryService<R: Rng, C: SecureChannel> {
    registry: TicketRegistry,
    status: DrawStatus,
    last_sender: Option<Identity>,
    rng: R,
    channel: C,
}

impl<R: Rng, C: SecureChannel> LotteryService<R, C> {
    pub fn new(rng: R, channel: C) -> Self {
        Self {
            registry: TicketRegistry::new(),
            status: DrawStatus::Undeclared,
            last_sender: None,
            rng,
            channel,
        }
    }

    /// Handle one inbound client message and send exactly one reply to its
    /// sender. Every client input recovers to a reply; only a channel
    /// failure propagates.
    pub fn on_client_message(
        &mut self,
        sender: Identity,
        body: &[u8],
    ) -> Result<(), ChannelError> {
        self.last_sender = Some(sender.clone());
        let reply = self.handle_request(body);
        debug!(%reply, "replying to client");
        self.channel.send(&sender, reply.encode())
    }

    fn handle_request(&mut self, body: &[u8]) -> Reply {
        let request = match Request::parse(body) {
            Ok(request) => request,
            Err(RequestError::Malformed) => {
                warn!(len = body.len(), "malformed client request");
                return Reply::Malformed;
            }
            Err(RequestError::UnknownCommand(command)) => {
                warn!(%command, "unknown client command");
                return Reply::InvalidInput;
            }
        };
        match request {
            Request::Buy(candidate) => match self.registry.register(&candidate) {
                Ok(RegisterOutcome::Registered(value)) => {
                    info!(value, total = self.registry.len(), "ticket registered");
                    Reply::Registered(value)
                }
                Ok(RegisterOutcome::Duplicate(value)) => {
                    debug!(value, "duplicate ticket");
                    Reply::Duplicate(value)
                }
                Err(err) => {
                    warn!(%err, "rejected ticket");
                    Reply::InvalidTicket
                }
            },
            Request::Result => match self.status {
                DrawStatus::Declared(value) => Reply::Winner(value),
                DrawStatus::Undeclared => Reply::ResultsPending,
            },
        }
    }

    /// Handle the opaque host command.
    ///
    /// On success the returned payload is the host channel reply, and the
    /// identical text has been posted once to the last known client sender.
    /// The recipient is checked before any draw, so a rejected declare
    /// leaves the draw status untouched. A repeated `DECLARE` re-delivers
    /// the declared outcome without re-drawing (first draw wins).
    pub fn on_host_command(&mut self, body: &[u8]) -> Result<Bytes, HostError> {
        if HostCommand::parse(body).is_none() {
            return Err(HostError::UnexpectedCommand {
                payload: body.to_vec(),
            });
        }
        let Some(recipient) = self.last_sender.clone() else {
            return Err(HostError::NoKnownRecipient);
        };
        let outcome = match self.status {
            DrawStatus::Declared(value) => DrawOutcome::Winner(value),
            DrawStatus::Undeclared => match self.registry.draw(&mut self.rng) {
                Some(value) => {
                    self.status = DrawStatus::Declared(value);
                    info!(value, entries = self.registry.len(), "winner declared");
                    DrawOutcome::Winner(value)
                }
                None => {
                    warn!("declare with empty registry; draw not possible");
                    DrawOutcome::Empty
                }
            },
        };
        let payload = outcome.encode();
        self.channel.send(&recipient, payload.clone())?;
        Ok(payload)
    }

    pub fn status(&self) -> DrawStatus {
        self.status
    }

    pub fn registry(&self) -> &TicketRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_client_identity, create_draw_rng, MockChannel};

    fn create_service() -> (
        LotteryService<rand_chacha::ChaCha8Rng, MockChannel>,
        MockChannel,
    ) {
        let channel = MockChannel::new();
        let service = LotteryService::new(create_draw_rng(0), channel.clone());
        (service, channel)
    }

    #[test]
    fn test_buy_then_duplicate() {
        let (mut service, channel) = create_service();
        let alice = create_client_identity(1);

        service
            .on_client_message(alice.clone(), b"BUY:123456")
            .expect("send reply");
        assert_eq!(
            channel.last_text(),
            Some("Lottery number 123456 registered.".to_string())
        );

        service
            .on_client_message(alice, b"BUY:123456")
            .expect("send reply");
        assert_eq!(
            channel.last_text(),
            Some("Lottery number 123456 already selected.".to_string())
        );
        assert_eq!(service.registry().len(), 1);
    }

    #[test]
    fn test_invalid_ticket_does_not_mutate() {
        let (mut service, channel) = create_service();
        let alice = create_client_identity(1);

        service
            .on_client_message(alice, b"BUY:12345")
            .expect("send reply");
        assert_eq!(
            channel.last_text(),
            Some("Invalid lottery number: expected exactly six digits.".to_string())
        );
        assert!(service.registry().is_empty());
    }

    #[test]
    fn test_result_before_declare() {
        let (mut service, channel) = create_service();
        let alice = create_client_identity(1);

        service
            .on_client_message(alice, b"RESULT:")
            .expect("send reply");
        assert_eq!(channel.last_text(), Some("Results not declared".to_string()));
    }

    #[test]
    fn test_unknown_command_replies_invalid_input() {
        let (mut service, channel) = create_service();
        let alice = create_client_identity(1);

        service
            .on_client_message(alice, b"SELL:123456")
            .expect("send reply");
        assert_eq!(channel.last_text(), Some("Invalid input".to_string()));
    }

    #[test]
    fn test_malformed_message_is_answered_and_recoverable() {
        let (mut service, channel) = create_service();
        let alice = create_client_identity(1);

        service
            .on_client_message(alice.clone(), b"FOO")
            .expect("send reply");
        assert_eq!(
            channel.last_text(),
            Some("Malformed request: expected COMMAND:ARG".to_string())
        );

        // The service stays usable for well-formed traffic.
        service
            .on_client_message(alice, b"BUY:654321")
            .expect("send reply");
        assert_eq!(
            channel.last_text(),
            Some("Lottery number 654321 registered.".to_string())
        );
    }

    #[test]
    fn test_every_message_gets_exactly_one_reply_to_its_sender() {
        let (mut service, channel) = create_service();
        let alice = create_client_identity(1);
        let bob = create_client_identity(2);

        service
            .on_client_message(alice.clone(), b"BUY:111111")
            .expect("send reply");
        service
            .on_client_message(bob.clone(), b"BUY:222222")
            .expect("send reply");
        service
            .on_client_message(alice.clone(), b"RESULT:")
            .expect("send reply");

        let sent = channel.sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].0, alice);
        assert_eq!(sent[1].0, bob);
        assert_eq!(sent[2].0, alice);
    }

    #[test]
    fn test_declare_before_any_client_is_rejected_without_drawing() {
        let (mut service, channel) = create_service();

        assert_eq!(
            service.on_host_command(b"DECLARE"),
            Err(HostError::NoKnownRecipient)
        );
        assert_eq!(service.status(), DrawStatus::Undeclared);
        assert!(channel.sent().is_empty());
    }

    #[test]
    fn test_unexpected_host_command_is_rejected() {
        let (mut service, _channel) = create_service();
        let alice = create_client_identity(1);
        service
            .on_client_message(alice, b"BUY:123456")
            .expect("send reply");

        let err = service
            .on_host_command(b"RESET")
            .expect_err("non-DECLARE must be rejected");
        assert_eq!(
            err,
            HostError::UnexpectedCommand {
                payload: b"RESET".to_vec()
            }
        );
        assert_eq!(service.status(), DrawStatus::Undeclared);
    }

    #[test]
    fn test_declare_with_empty_registry() {
        let (mut service, channel) = create_service();
        let alice = create_client_identity(1);
        service
            .on_client_message(alice.clone(), b"RESULT:")
            .expect("send reply");

        let payload = service.on_host_command(b"DECLARE").expect("declare");
        assert_eq!(&payload[..], b"Draw not possible: no lottery entries.");
        assert_eq!(service.status(), DrawStatus::Undeclared);

        // The same text went to the last sender.
        let sent = channel.sent();
        let (recipient, delivered) = sent.last().expect("outcome delivered");
        assert_eq!(recipient, &alice);
        assert_eq!(delivered, &payload);

        // A later declare after registrations can still draw.
        service
            .on_client_message(alice, b"BUY:123456")
            .expect("send reply");
        let payload = service.on_host_command(b"DECLARE").expect("declare");
        assert_eq!(&payload[..], b"123456");
        assert_eq!(service.status(), DrawStatus::Declared(123456));
    }

    #[test]
    fn test_declare_delivers_identical_text_to_host_and_client() {
        let (mut service, channel) = create_service();
        let alice = create_client_identity(1);
        service
            .on_client_message(alice.clone(), b"BUY:123456")
            .expect("send reply");
        let before = channel.sent().len();

        let payload = service.on_host_command(b"DECLARE").expect("declare");
        assert_eq!(&payload[..], b"123456");

        let sent = channel.sent();
        assert_eq!(sent.len(), before + 1);
        let (recipient, delivered) = sent.last().expect("outcome delivered");
        assert_eq!(recipient, &alice);
        assert_eq!(delivered, &payload);
    }

    #[test]
    fn test_redeclare_is_idempotent() {
        let (mut service, _channel) = create_service();
        let alice = create_client_identity(1);
        for candidate in ["111111", "222222", "333333", "444444"] {
            service
                .on_client_message(alice.clone(), format!("BUY:{candidate}").as_bytes())
                .expect("send reply");
        }

        let first = service.on_host_command(b"DECLARE").expect("declare");
        let DrawStatus::Declared(winner) = service.status() else {
            panic!("draw must declare a winner");
        };
        // Repeated declares re-deliver the same outcome without re-drawing.
        for _ in 0..10 {
            let again = service.on_host_command(b"DECLARE").expect("declare");
            assert_eq!(again, first);
            assert_eq!(service.status(), DrawStatus::Declared(winner));
        }
    }

    #[test]
    fn test_result_after_declare_returns_winner() {
        let (mut service, channel) = create_service();
        let alice = create_client_identity(1);
        service
            .on_client_message(alice.clone(), b"BUY:123456")
            .expect("send reply");
        service.on_host_command(b"DECLARE").expect("declare");

        for _ in 0..3 {
            service
                .on_client_message(alice.clone(), b"RESULT:")
                .expect("send reply");
            assert_eq!(channel.last_text(), Some("123456".to_string()));
        }
    }

    #[test]
    fn test_declare_outcome_goes_to_most_recent_sender() {
        let (mut service, channel) = create_service();
        let alice = create_client_identity(1);
        let bob = create_client_identity(2);

        service
            .on_client_message(alice, b"BUY:123456")
            .expect("send reply");
        service
            .on_client_message(bob.clone(), b"BUY:654321")
            .expect("send reply");

        service.on_host_command(b"DECLARE").expect("declare");
        let sent = channel.sent();
        let (recipient, _) = sent.last().expect("outcome delivered");
        // Last-writer-wins addressing.
        assert_eq!(recipient, &bob);
    }

    #[test]
    fn test_channel_failure_propagates() {
        let (mut service, channel) = create_service();
        let alice = create_client_identity(1);
        service
            .on_client_message(alice.clone(), b"BUY:123456")
            .expect("send reply");

        channel.set_fail(true);
        assert!(service.on_client_message(alice, b"RESULT:").is_err());
        assert!(matches!(
            service.on_host_command(b"DECLARE"),
            Err(HostError::Channel(_))
        ));
    }
}
