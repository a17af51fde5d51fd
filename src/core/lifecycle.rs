//! # Fetch Lifecycle
//!
//! Every topic activation gets a fresh generation number and cancellation
//! token. Two tasks run for it, side by side:
//!
//! ```text
//!            begin_fetch(topic)  ── cancels the previous token
//!                   │
//!        ┌──────────┴──────────┐
//!        ▼                     ▼
//!  run_definition          run_art
//!  (stream → chunks)       (one JSON answer, retried)
//!        │                     │
//!        └──── Action { generation, .. } ───▶ update()
//! ```
//!
//! A task checks its token before each send, and the reducer drops actions
//! whose generation is no longer current. Cancellation never aborts the
//! network call itself; its result is simply thrown away.

use std::sync::Arc;
use std::sync::mpsc;
use std::time::Instant;

use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::core::action::Action;
use crate::inference::art::generate_ascii_art;
use crate::inference::definition::{ERROR_PREFIX, stream_definition};
use crate::inference::{GenerationSettings, GenerativeBackend, ProviderError, StreamChunk};

/// The active topic activation, owned by `App`.
#[derive(Debug)]
pub struct FetchLifecycle {
    pub generation: u64,
    pub topic: String,
    pub started_at: Instant,
    token: CancellationToken,
}

impl FetchLifecycle {
    pub fn new(generation: u64, topic: String) -> Self {
        Self {
            generation,
            topic,
            started_at: Instant::now(),
            token: CancellationToken::new(),
        }
    }

    pub fn ticket(&self) -> FetchTicket {
        FetchTicket {
            generation: self.generation,
            topic: self.topic.clone(),
            token: self.token.clone(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// What a fetch task gets to know about its activation.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub generation: u64,
    pub topic: String,
    pub token: CancellationToken,
}

impl PartialEq for FetchTicket {
    fn eq(&self, other: &Self) -> bool {
        self.generation == other.generation && self.topic == other.topic
    }
}

enum Consumed {
    Finished,
    Failed(String),
    Cancelled,
}

/// Streams the definition for `ticket.topic` into `actions`.
///
/// Sends `DefinitionChunk` per fragment, then exactly one of
/// `DefinitionDone` / `DefinitionFailed`, unless the ticket is cancelled,
/// in which case it goes quiet.
pub async fn run_definition(
    backend: Arc<dyn GenerativeBackend>,
    settings: GenerationSettings,
    ticket: FetchTicket,
    actions: mpsc::Sender<Action>,
) {
    let generation = ticket.generation;
    let token = ticket.token.clone();
    let (chunk_tx, mut chunk_rx) = tokio::sync::mpsc::channel::<StreamChunk>(100);

    let producer = stream_definition(backend.as_ref(), &settings, &ticket.topic, chunk_tx);

    let consumer_actions = actions.clone();
    let consumer_token = token.clone();
    let consumer = async move {
        let mut forwarded = 0usize;
        loop {
            let chunk = tokio::select! {
                biased;
                _ = consumer_token.cancelled() => return Consumed::Cancelled,
                chunk = chunk_rx.recv() => chunk,
            };
            match chunk {
                Some(StreamChunk::Content(text)) => {
                    if consumer_token.is_cancelled() {
                        return Consumed::Cancelled;
                    }
                    if text.starts_with(ERROR_PREFIX) {
                        return Consumed::Failed(text);
                    }
                    forwarded += 1;
                    if consumer_actions
                        .send(Action::DefinitionChunk { generation, text })
                        .is_err()
                    {
                        warn!("Failed to forward DefinitionChunk: receiver dropped");
                        return Consumed::Cancelled;
                    }
                }
                Some(StreamChunk::Completed) => {}
                None => {
                    debug!("Definition stream closed after {} chunks", forwarded);
                    return Consumed::Finished;
                }
            }
        }
    };

    let (produced, consumed) = tokio::join!(producer, consumer);

    if token.is_cancelled() {
        debug!("Definition for {:?} superseded, discarding", ticket.topic);
        return;
    }

    let outcome = match consumed {
        Consumed::Cancelled => return,
        Consumed::Failed(message) => Action::DefinitionFailed {
            generation,
            message,
        },
        Consumed::Finished => match produced {
            Ok(()) | Err(ProviderError::ChannelClosed) => Action::DefinitionDone { generation },
            Err(e) => Action::DefinitionFailed {
                generation,
                message: e.to_string(),
            },
        },
    };

    info!("Definition for {:?} settled: {:?}", ticket.topic, outcome);
    if actions.send(outcome).is_err() {
        warn!("Failed to send definition outcome: receiver dropped");
    }
}

/// Fetches art for `ticket.topic`; failures become `ArtFailed`, which the
/// reducer turns into fallback art.
pub async fn run_art(
    backend: Arc<dyn GenerativeBackend>,
    settings: GenerationSettings,
    ticket: FetchTicket,
    actions: mpsc::Sender<Action>,
) {
    let result = generate_ascii_art(backend.as_ref(), &settings, &ticket.topic).await;

    if ticket.token.is_cancelled() {
        debug!("Art for {:?} superseded, discarding", ticket.topic);
        return;
    }

    let action = match result {
        Ok(art) => Action::ArtReady {
            generation: ticket.generation,
            art,
        },
        Err(e) => {
            warn!("Failed to generate ASCII art for {:?}: {}", ticket.topic, e);
            Action::ArtFailed {
                generation: ticket.generation,
            }
        }
    };
    if actions.send(action).is_err() {
        warn!("Failed to send art result: receiver dropped");
    }
}
