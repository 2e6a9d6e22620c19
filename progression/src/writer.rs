//! Background snapshot writer.
//!
//! Mutations hand the latest snapshot to a watch channel and return at once.
//! A single task saves whatever is newest when it wakes up, so revisions
//! superseded in the meantime are never written and saves land in order.
//! Failed saves are not retried; they are reported on the warning channel.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::snapshot::ProgressSnapshot;
use crate::store::{ProgressStore, StoreKey};
use crate::types::{PersistenceOp, PersistenceWarning};

#[derive(Debug, Clone, Default)]
struct PendingSave {
    revision: u64,
    snapshot: Option<ProgressSnapshot>,
}

/// Fire-and-forget persistence for one store key.
pub struct SnapshotWriter {
    pending: watch::Sender<PendingSave>,
    attempted: watch::Receiver<u64>,
    task: JoinHandle<()>,
}

impl SnapshotWriter {
    /// Spawn the writer task on the current tokio runtime.
    pub fn spawn(
        store: Arc<dyn ProgressStore>,
        key: StoreKey,
        warnings: mpsc::UnboundedSender<PersistenceWarning>,
    ) -> Self {
        let (pending, mut pending_rx) = watch::channel(PendingSave::default());
        let (attempted_tx, attempted) = watch::channel(0u64);

        let task = tokio::spawn(async move {
            // Ends once the sender is dropped and the last value was seen.
            while pending_rx.changed().await.is_ok() {
                let PendingSave { revision, snapshot } = pending_rx.borrow_and_update().clone();
                let Some(snapshot) = snapshot else {
                    continue;
                };

                match store.save(&key, &snapshot).await {
                    Ok(()) => {
                        debug!(key = %key, store = store.id(), revision, "Saved progress snapshot");
                    }
                    Err(err) => {
                        warn!(
                            key = %key,
                            store = store.id(),
                            revision,
                            error = %err,
                            "Failed to save progress snapshot"
                        );
                        let _ = warnings.send(PersistenceWarning::new(
                            key.clone(),
                            PersistenceOp::Save,
                            revision,
                            err.to_string(),
                        ));
                    }
                }

                attempted_tx.send_replace(revision);
            }
        });

        Self {
            pending,
            attempted,
            task,
        }
    }

    /// Queue a snapshot, replacing any not yet picked up.
    pub fn submit(&self, revision: u64, snapshot: ProgressSnapshot) {
        self.pending.send_replace(PendingSave {
            revision,
            snapshot: Some(snapshot),
        });
    }

    /// Highest revision the writer has attempted to save.
    pub fn attempted_revision(&self) -> u64 {
        *self.attempted.borrow()
    }

    /// Wait until a save at or beyond `revision` has been attempted.
    pub async fn flush(&self, revision: u64) {
        let mut attempted = self.attempted.clone();
        // Err means the task is gone; nothing left to wait for.
        let _ = attempted.wait_for(|done| *done >= revision).await;
    }

    /// Flush, stop the task and wait for it to exit.
    pub async fn close(self, revision: u64) {
        self.flush(revision).await;

        let Self { pending, task, .. } = self;
        drop(pending);
        if let Err(err) = task.await {
            warn!(error = %err, "Snapshot writer task ended abnormally");
        }
    }
}
