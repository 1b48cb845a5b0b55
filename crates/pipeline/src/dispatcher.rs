//! Fire-and-forget dispatch onto a bounded worker pool.
//!
//! [`Dispatcher::start`] spawns a fixed number of workers draining one
//! bounded channel. [`dispatch`](Dispatcher::dispatch) hands off a document
//! id and returns immediately; run outcomes are only observable through the
//! document's status fields, never as errors at the call site.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use docflow_core::DocumentId;

use crate::processor::Processor;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("document {0} already has a run in flight")]
    AlreadyInFlight(DocumentId),

    #[error("dispatch queue is full")]
    QueueFull,

    #[error("dispatcher is closed")]
    Closed,
}

pub struct Dispatcher {
    tx: mpsc::Sender<DocumentId>,
    in_flight: Arc<Mutex<HashSet<DocumentId>>>,
    workers: Vec<JoinHandle<()>>,
}

impl Dispatcher {
    /// Spawn `workers` tasks processing dispatched ids through `processor`.
    pub fn start(processor: Arc<Processor>, workers: usize, queue_capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let in_flight: Arc<Mutex<HashSet<DocumentId>>> = Arc::new(Mutex::new(HashSet::new()));

        let handles = (0..workers.max(1))
            .map(|worker| {
                let rx = rx.clone();
                let processor = processor.clone();
                let in_flight = in_flight.clone();
                tokio::spawn(async move {
                    loop {
                        // Hold the receiver lock only while waiting for the
                        // next id; processing runs unlocked.
                        let id = { rx.lock().await.recv().await };
                        let Some(id) = id else { break };

                        match processor.process(id).await {
                            Ok(outcome) => info!(
                                worker,
                                document_id = %id,
                                status = %outcome.status,
                                segments = outcome.segments_written,
                                "run finished"
                            ),
                            Err(e) => {
                                error!(worker, document_id = %id, error = %e, "run aborted")
                            }
                        }
                        in_flight.lock().unwrap().remove(&id);
                    }
                })
            })
            .collect();

        Self {
            tx,
            in_flight,
            workers: handles,
        }
    }

    /// Enqueue one processing run for `id` and return immediately.
    ///
    /// At most one run per document id is in flight at a time; a concurrent
    /// second dispatch would interleave segment writes and break the
    /// contiguous-order invariant.
    pub fn dispatch(&self, id: DocumentId) -> Result<(), DispatchError> {
        {
            let mut in_flight = self.in_flight.lock().unwrap();
            if !in_flight.insert(id) {
                warn!(document_id = %id, "dispatch rejected, run already in flight");
                return Err(DispatchError::AlreadyInFlight(id));
            }
        }

        match self.tx.try_send(id) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.in_flight.lock().unwrap().remove(&id);
                match e {
                    mpsc::error::TrySendError::Full(_) => Err(DispatchError::QueueFull),
                    mpsc::error::TrySendError::Closed(_) => Err(DispatchError::Closed),
                }
            }
        }
    }

    /// Stop accepting work and wait for in-flight runs to finish.
    pub async fn close(self) {
        drop(self.tx);
        for handle in self.workers {
            let _ = handle.await;
        }
    }
}
