//! One-slot sample mailbox between the sampler task and its consumer.
//!
//! The sampler overwrites the slot once per processed frame; a slow consumer
//! simply misses intermediate frames (drop-oldest) and always observes a
//! complete, never partially written sequence.

use rimlight_sampler::SampleSequence;
use tokio::sync::watch;

/// Create a connected feed writer/reader pair.
pub fn sample_feed() -> (SampleFeed, SampleFeedReader) {
    let (tx, rx) = watch::channel(SampleSequence::new(0));
    (SampleFeed { tx }, SampleFeedReader { rx })
}

// ── Writer ────────────────────────────────────────────────────────────────────

/// Single-writer handle held by the sampler pipeline.
pub struct SampleFeed {
    tx: watch::Sender<SampleSequence>,
}

impl SampleFeed {
    /// Replace the slot with the latest sequence.
    ///
    /// Never blocks and never fails; publishing with no live reader is fine.
    pub fn publish(&self, seq: &SampleSequence) {
        self.tx.send_replace(seq.clone());
    }

    /// Extra readers for additional consumers (preview + hardware driver).
    pub fn subscribe(&self) -> SampleFeedReader {
        SampleFeedReader { rx: self.tx.subscribe() }
    }
}

// ── Reader ────────────────────────────────────────────────────────────────────

/// Consumer handle. Await [`changed`](Self::changed), then take
/// [`latest`](Self::latest).
pub struct SampleFeedReader {
    rx: watch::Receiver<SampleSequence>,
}

impl SampleFeedReader {
    /// Wait until a new sequence is published.
    ///
    /// Returns `false` when the writer is gone and no further updates can
    /// arrive.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Snapshot of the most recently published sequence.
    pub fn latest(&mut self) -> SampleSequence {
        self.rx.borrow_and_update().clone()
    }
}
