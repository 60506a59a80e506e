//! Actor that serializes inbound events through a single queue.

use futures::{channel::mpsc, StreamExt};
use rand::Rng;
use tracing::debug;

use crate::channel::SecureChannel;
use crate::ingress::{Mailbox, Message};
use crate::service::LotteryService;

/// Configuration for the lottery actor.
pub struct Config {
    /// Number of inbound events to buffer before senders block.
    pub mailbox_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self { mailbox_size: 64 }
    }
}

/// Processes inbound events one at a time, so a registration and a draw can
/// never interleave and no two events can both observe an undeclared result
/// and both perform a draw.
pub struct Actor<R: Rng, C: SecureChannel> {
    service: LotteryService<R, C>,
    receiver: mpsc::Receiver<Message>,
}

impl<R: Rng, C: SecureChannel> Actor<R, C> {
    pub fn new(config: Config, service: LotteryService<R, C>) -> (Self, Mailbox) {
        let (sender, receiver) = mpsc::channel(config.mailbox_size);
        (Self { service, receiver }, Mailbox::new(sender))
    }

    /// Drain the event queue until every mailbox has been dropped.
    pub async fn run(mut self) {
        while let Some(message) = self.receiver.next().await {
            match message {
                Message::Client {
                    sender,
                    body,
                    response,
                } => {
                    let result = self.service.on_client_message(sender, &body);
                    let _ = response.send(result);
                }
                Message::Host { body, response } => {
                    let result = self.service.on_host_command(&body);
                    let _ = response.send(result);
                }
            }
        }
        debug!("lottery actor stopped");
    }
}
