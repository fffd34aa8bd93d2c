//! # Trajectory log module
//!
//! The control loop emits one `TrajRecord` per cycle into a `TrajLog` sink. Sinks are provided
//! for memory, CSV archives and a bounded queue which moves the work of another sink onto a
//! background thread.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod archive;
mod queued;

pub use archive::ArchiveTrajLog;
pub use queued::QueuedTrajLog;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::tm::TrajRecord;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A sink for trajectory records.
///
/// Logging is best effort, a sink which cannot store a record reports it
/// itself rather than failing the control cycle.
pub trait TrajLog {
    /// Log a single record. Records arrive in cycle order.
    fn log(&mut self, record: &TrajRecord);

    /// Flush any buffered records.
    fn flush(&mut self) {}
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A trajectory log which keeps every record in memory.
#[derive(Debug, Default, Clone)]
pub struct MemTrajLog {
    records: Vec<TrajRecord>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MemTrajLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the records logged so far.
    pub fn records(&self) -> &[TrajRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TrajRecord> {
        self.records
    }
}

impl TrajLog for MemTrajLog {
    fn log(&mut self, record: &TrajRecord) {
        self.records.push(*record);
    }
}

/// Log into two sinks at once.
impl<A: TrajLog, B: TrajLog> TrajLog for (A, B) {
    fn log(&mut self, record: &TrajRecord) {
        self.0.log(record);
        self.1.log(record);
    }

    fn flush(&mut self) {
        self.0.flush();
        self.1.flush();
    }
}
