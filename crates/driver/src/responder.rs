//! The `responder` module contains the [Responder] trait, the boundary to the layer that turns
//! responses into transactions.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use honest_challenger_solvers::fault::Response;
use tokio::sync::mpsc;

/// The capacity of the channel created by [ChannelResponder::channel].
pub const RESPONSE_CHANNEL_CAPACITY: usize = 128;

/// The [Responder] trait defines the interface for submitting a [Response] to a dispute game.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Submits an actionable [Response].
    async fn respond(&self, response: Response) -> Result<()>;
}

/// A [Responder] that forwards every [Response] onto an MPSC channel, to be dispatched by
/// whoever holds the receiving half.
#[derive(Debug, Clone)]
pub struct ChannelResponder {
    /// The sending handle of the MPSC channel used to dispatch responses.
    tx: mpsc::Sender<Response>,
}

impl ChannelResponder {
    /// Creates a new [ChannelResponder] and the receiving handle of its channel.
    pub fn channel() -> (Self, mpsc::Receiver<Response>) {
        let (tx, rx) = mpsc::channel(RESPONSE_CHANNEL_CAPACITY);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Responder for ChannelResponder {
    async fn respond(&self, response: Response) -> Result<()> {
        self.tx
            .send(response)
            .await
            .map_err(|_| anyhow!("Response channel closed"))
    }
}
