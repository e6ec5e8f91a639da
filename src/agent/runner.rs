use std::sync::Arc;

use log::debug;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::dispatch::{Dispatcher, HttpDispatcher};
use super::interaction::TriggerRequest;
use super::normalize::{FieldProbeNormalizer, Outcome, ResponseNormalizer};
use super::payload::Metadata;

/// Identifies one mounted card instance. A remounted card gets a new id, so
/// results issued by an earlier mount are never applied to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub u64);

/// A finished dispatch, waiting to be applied to its card.
#[derive(Debug)]
pub struct Completion {
    pub card: CardId,
    pub seq: u64,
    pub outcome: Outcome,
}

/// Runs accepted triggers on background tasks and hands their outcomes back
/// through a channel, polled from the UI tick.
pub struct TriggerRunner {
    dispatcher: Arc<dyn Dispatcher>,
    normalizer: Arc<dyn ResponseNormalizer>,
    metadata: Metadata,
    events_tx: UnboundedSender<Completion>,
    events_rx: UnboundedReceiver<Completion>,
}

impl TriggerRunner {
    pub fn new(
        dispatcher: Arc<dyn Dispatcher>,
        normalizer: Arc<dyn ResponseNormalizer>,
        metadata: Metadata,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            dispatcher,
            normalizer,
            metadata,
            events_tx,
            events_rx,
        }
    }

    /// Real HTTP dispatch with the field-probing normalizer.
    pub fn http(metadata: Metadata) -> Self {
        Self::new(
            Arc::new(HttpDispatcher::new()),
            Arc::new(FieldProbeNormalizer),
            metadata,
        )
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Starts the request without waiting for it. Must be called within a tokio runtime.
    pub fn spawn(&self, card: CardId, request: TriggerRequest) {
        let tx = self.events_tx.clone();
        let dispatcher = Arc::clone(&self.dispatcher);
        let normalizer = Arc::clone(&self.normalizer);
        let metadata = self.metadata.clone();
        tokio::spawn(async move {
            let outcome = request
                .execute(dispatcher.as_ref(), normalizer.as_ref(), &metadata)
                .await;
            debug!("Card {:?} request #{} finished", card, request.seq);
            let _ = tx.send(Completion {
                card,
                seq: request.seq,
                outcome,
            });
        });
    }

    /// Non-blocking; returns `None` when nothing has finished yet.
    pub fn poll(&mut self) -> Option<Completion> {
        self.events_rx.try_recv().ok()
    }

    /// Waits for the next completion.
    pub async fn next(&mut self) -> Option<Completion> {
        self.events_rx.recv().await
    }
}
