//! Zero-capacity hand-off between the dispatcher and the workers.
//!
//! A send only succeeds when a worker is already blocked waiting to
//! receive, so "queue full" and "worker busy" are the same condition and no
//! backlog is ever buffered.

use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use fluxengine_core::job::Job;

/// Why a hand-off did not happen. The job is handed back untouched.
#[derive(Debug, thiserror::Error)]
pub enum HandOffError {
    #[error("no worker is ready to receive")]
    Busy(Job),

    #[error("job queue is closed")]
    Closed(Job),
}

/// Create a connected producer/consumer pair with zero buffer capacity.
pub fn rendezvous() -> (JobSender, JobReceiver) {
    let (tx, rx) = mpsc::sync_channel(0);
    (
        JobSender {
            inner: RwLock::new(Some(tx)),
        },
        JobReceiver {
            inner: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Producer side. Never blocks.
///
/// There is exactly one `SyncSender` behind this handle, so [`close`]
/// really disconnects the channel even while requests hold the handle.
///
/// [`close`]: JobSender::close
#[derive(Debug)]
pub struct JobSender {
    inner: RwLock<Option<SyncSender<Job>>>,
}

impl JobSender {
    /// Hand `job` to a worker that is waiting right now, or give it back.
    pub fn try_hand_off(&self, job: Job) -> Result<(), HandOffError> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = guard.as_ref() else {
            return Err(HandOffError::Closed(job));
        };
        match tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(job)) => Err(HandOffError::Busy(job)),
            Err(TrySendError::Disconnected(job)) => Err(HandOffError::Closed(job)),
        }
    }

    /// Close the queue. Returns `false` if it was already closed.
    ///
    /// Workers finish the job in hand, then observe the closure and exit.
    pub fn close(&self) -> bool {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// Consumer side, shared by every worker of a pool.
///
/// The receiver sits behind a mutex: the worker holding the lock is the one
/// blocked on the rendezvous, the others queue up on the lock.
#[derive(Debug, Clone)]
pub struct JobReceiver {
    inner: Arc<Mutex<Receiver<Job>>>,
}

impl JobReceiver {
    /// Block until a job arrives. `None` once the queue is closed.
    pub fn recv(&self) -> Option<Job> {
        let rx = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        rx.recv().ok()
    }
}
