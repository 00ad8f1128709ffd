use anyhow::{Result, bail};
use tokio::sync::mpsc;

/// A deferred request to settle a freshly created payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingJob {
    pub payment_id: i64,
    pub email: String,
}

/// Hands processing jobs to whatever settles them later. Dispatch never waits
/// and the caller never learns how the job ends.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessingDispatcher {
    fn dispatch(&self, job: ProcessingJob) -> Result<()>;
}

pub type ProcessingReceiver = mpsc::Receiver<ProcessingJob>;

#[derive(Clone)]
pub struct QueuedProcessingDispatcher {
    tx: mpsc::Sender<ProcessingJob>,
}

/// Creates the bounded queue shared by the dispatcher and the settlement worker.
pub fn processing_queue(capacity: usize) -> (QueuedProcessingDispatcher, ProcessingReceiver) {
    let (tx, rx) = mpsc::channel::<ProcessingJob>(capacity.max(1));
    (QueuedProcessingDispatcher { tx }, rx)
}

impl ProcessingDispatcher for QueuedProcessingDispatcher {
    fn dispatch(&self, job: ProcessingJob) -> Result<()> {
        match self.tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(job)) => {
                bail!("processing queue full; dropping job for payment {}", job.payment_id)
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                bail!("processing queue closed; dropping job for payment {}", job.payment_id)
            }
        }
    }
}
