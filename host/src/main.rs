//! Loopback demonstration host.
//!
//! Drives the lottery actor the way the real host would: scripted clients
//! buy tickets and query the result over the (mocked) secure messaging
//! channel, then the host issues `DECLARE` and logs the winner. No real
//! sockets or attestation; the channel substrate is out of scope for the
//! core and mocked here.

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tombola_enclave::{
    mocks::{create_client_identity, MockChannel},
    Actor, Config, LotteryService,
};
use tombola_types::wire::DECLARE;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Loopback host for the tombola lottery enclave")]
struct Args {
    /// Number of scripted clients.
    #[arg(long, default_value = "5")]
    clients: u64,

    /// Tickets each client attempts to buy.
    #[arg(long, default_value = "1")]
    tickets_per_client: u64,

    /// Seed for the draw RNG; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let channel = MockChannel::new();
    let service = LotteryService::new(rng, channel.clone());
    let (actor, mut mailbox) = Actor::new(Config::default(), service);
    let actor = tokio::spawn(actor.run());

    // Clients buy sequential numbers around a shared base, so some collide
    // and get duplicate replies.
    for client in 0..args.clients {
        let identity = create_client_identity(client);
        for ticket in 0..args.tickets_per_client {
            let number = 123_450 + (client + ticket) % 10;
            let body = Bytes::from(format!("BUY:{number:06}"));
            mailbox
                .deliver(identity.clone(), body)
                .await
                .context("ticket delivery failed")?;
        }
    }

    let outcome = mailbox
        .host_command(Bytes::from_static(DECLARE.as_bytes()))
        .await
        .context("declare failed")?;
    let winner = std::str::from_utf8(&outcome).context("outcome was not UTF-8")?;
    info!(winner, "declared lottery");

    // Every client asks for the result through the same channel.
    for client in 0..args.clients {
        let identity = create_client_identity(client);
        mailbox
            .deliver(identity, Bytes::from_static(b"RESULT:"))
            .await
            .context("result query failed")?;
    }

    for (recipient, payload) in channel.sent() {
        debug!(?recipient, payload = %String::from_utf8_lossy(&payload), "client received");
    }

    drop(mailbox);
    actor.await.context("lottery actor panicked")?;
    Ok(())
}
