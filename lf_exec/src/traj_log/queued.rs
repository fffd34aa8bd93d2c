//! Bounded queue trajectory log
//!
//! Records are pushed into a bounded channel and written to the wrapped sink by a background
//! thread. When the queue is full the record is dropped and counted so a slow sink never delays
//! the control cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, warn};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};

use super::TrajLog;
use comms_if::tm::TrajRecord;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A trajectory log which forwards records to another sink on a background thread.
pub struct QueuedTrajLog<L> {
    sender: Option<SyncSender<TrajRecord>>,

    jh: Option<JoinHandle<L>>,

    num_dropped: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<L> QueuedTrajLog<L>
where
    L: TrajLog + Send + 'static
{
    /// Start the background thread writing into `inner`. At most `capacity` records are held in
    /// the queue.
    pub fn new(inner: L, capacity: usize) -> Self {
        let (tx, rx) = sync_channel(capacity);

        let jh = thread::spawn(move || drain_thread(inner, rx));

        Self {
            sender: Some(tx),
            jh: Some(jh),
            num_dropped: 0
        }
    }

    /// Number of records dropped so far.
    pub fn num_dropped(&self) -> u64 {
        self.num_dropped
    }

    /// Stop the queue once all pending records are written, returning the wrapped sink and the
    /// number of dropped records.
    ///
    /// The sink is `None` if the background thread panicked.
    pub fn finish(mut self) -> (Option<L>, u64) {
        let inner = self.shutdown();

        if self.num_dropped > 0 {
            warn!("Trajectory log queue dropped {} records", self.num_dropped);
        }
        else {
            info!("Trajectory log queue finished with no dropped records");
        }

        (inner, self.num_dropped)
    }

    fn shutdown(&mut self) -> Option<L> {
        // Closing the channel ends the drain loop
        self.sender.take();

        match self.jh.take()?.join() {
            Ok(inner) => Some(inner),
            Err(_) => {
                warn!("Trajectory log thread panicked");
                None
            }
        }
    }
}

impl<L> TrajLog for QueuedTrajLog<L>
where
    L: TrajLog + Send + 'static
{
    fn log(&mut self, record: &TrajRecord) {
        let sender = match self.sender {
            Some(ref s) => s,
            None => {
                self.num_dropped += 1;
                return;
            }
        };

        match sender.try_send(*record) {
            Ok(()) => (),
            Err(TrySendError::Full(_)) => {
                if self.num_dropped == 0 {
                    warn!("Trajectory log queue is full, dropping records");
                }
                self.num_dropped += 1;
            },
            Err(TrySendError::Disconnected(_)) => {
                if self.num_dropped == 0 {
                    warn!("Trajectory log thread has stopped, dropping records");
                }
                self.num_dropped += 1;
            }
        }
    }
}

impl<L> Drop for QueuedTrajLog<L> {
    fn drop(&mut self) {
        self.sender.take();

        if let Some(jh) = self.jh.take() {
            if jh.join().is_err() {
                warn!("Trajectory log thread panicked");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn drain_thread<L: TrajLog>(mut inner: L, receiver: Receiver<TrajRecord>) -> L {
    // Runs until the sender is dropped
    for record in receiver.iter() {
        inner.log(&record);
    }

    inner.flush();

    inner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traj_log::MemTrajLog;
    use std::sync::{Arc, Barrier};

    fn record(i: usize) -> TrajRecord {
        TrajRecord {
            timestamp: i as f64,
            ..Default::default()
        }
    }

    #[test]
    fn test_records_pass_through_in_order() {
        let mut log = QueuedTrajLog::new(MemTrajLog::new(), 1000);

        for i in 0..100 {
            log.log(&record(i));
        }

        let (inner, num_dropped) = log.finish();
        let records = inner.unwrap().into_records();

        assert_eq!(num_dropped, 0);
        assert_eq!(records.len(), 100);
        assert!(records.iter().enumerate().all(|(i, r)| r.timestamp == i as f64));
    }

    /// A sink which blocks on its first record until released.
    struct BlockedLog {
        barrier: Arc<Barrier>,
        blocked: bool,
        inner: MemTrajLog,
    }

    impl TrajLog for BlockedLog {
        fn log(&mut self, record: &TrajRecord) {
            if self.blocked {
                self.barrier.wait();
                self.blocked = false;
            }
            self.inner.log(record);
        }
    }

    #[test]
    fn test_full_queue_drops_and_counts() {
        let barrier = Arc::new(Barrier::new(2));
        let mut log = QueuedTrajLog::new(
            BlockedLog {
                barrier: barrier.clone(),
                blocked: true,
                inner: MemTrajLog::new()
            },
            2
        );

        // The thread holds at most one record while blocked, so with two
        // queued at most three are accepted. Sending never blocks.
        for i in 0..50 {
            log.log(&record(i));
        }

        barrier.wait();

        let (inner, num_dropped) = log.finish();
        let received = inner.unwrap().inner.into_records().len() as u64;

        assert!(num_dropped >= 47);
        assert_eq!(received + num_dropped, 50);
    }
}
