//! Mailbox for the lottery actor.

use bytes::Bytes;
use futures::{
    channel::{mpsc, oneshot},
    SinkExt,
};

use crate::channel::ChannelError;
use crate::service::HostError;
use tombola_types::Identity;

/// Events delivered to the lottery actor.
pub enum Message {
    /// An authenticated client message from the secure messaging channel.
    Client {
        sender: Identity,
        body: Bytes,
        response: oneshot::Sender<Result<(), ChannelError>>,
    },
    /// An opaque host command; the response carries the host channel reply.
    Host {
        body: Bytes,
        response: oneshot::Sender<Result<Bytes, HostError>>,
    },
}

/// Handle for submitting events to the lottery actor. Cloneable; all clones
/// feed the same serialized event queue.
#[derive(Clone)]
pub struct Mailbox {
    sender: mpsc::Sender<Message>,
}

impl Mailbox {
    pub(crate) fn new(sender: mpsc::Sender<Message>) -> Self {
        Self { sender }
    }

    /// Deliver one authenticated client message and wait until its reply
    /// has been posted.
    pub async fn deliver(&mut self, sender: Identity, body: Bytes) -> Result<(), ChannelError> {
        let (response, receiver) = oneshot::channel();
        if self
            .sender
            .send(Message::Client {
                sender,
                body,
                response,
            })
            .await
            .is_err()
        {
            return Err(ChannelError::new("lottery actor stopped"));
        }
        receiver
            .await
            .unwrap_or_else(|_| Err(ChannelError::new("lottery actor stopped")))
    }

    /// Issue an opaque host command and wait for the host channel reply.
    pub async fn host_command(&mut self, body: Bytes) -> Result<Bytes, HostError> {
        let (response, receiver) = oneshot::channel();
        if self
            .sender
            .send(Message::Host { body, response })
            .await
            .is_err()
        {
            return Err(HostError::Channel(ChannelError::new(
                "lottery actor stopped",
            )));
        }
        receiver
            .await
            .unwrap_or_else(|_| Err(HostError::Channel(ChannelError::new("lottery actor stopped"))))
    }
}
