//! CSV archive trajectory log

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use std::path::Path;

use super::TrajLog;
use comms_if::tm::TrajRecord;
use util::{
    archive::{ArchiveError, Archiver},
    session::Session
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Path of the trajectory archive relative to the session's archive root.
pub const TRAJ_ARCHIVE_PATH: &str = "traj.csv";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A trajectory log writing one CSV row per record.
pub struct ArchiveTrajLog {
    archiver: Archiver,

    /// Number of records which could not be written
    num_errors: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArchiveTrajLog {
    /// Create the trajectory archive inside the session's archive directory.
    pub fn from_session(session: &Session) -> Result<Self, ArchiveError> {
        Ok(Self {
            archiver: Archiver::from_path(session, TRAJ_ARCHIVE_PATH)?,
            num_errors: 0
        })
    }

    /// Create the trajectory archive at an explicit path.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        Ok(Self {
            archiver: Archiver::create(path)?,
            num_errors: 0
        })
    }

    /// Number of records which failed to be written.
    pub fn num_errors(&self) -> u64 {
        self.num_errors
    }
}

impl TrajLog for ArchiveTrajLog {
    fn log(&mut self, record: &TrajRecord) {
        if let Err(e) = self.archiver.serialise(record) {
            // Only the first failure is reported, the rest are counted
            if self.num_errors == 0 {
                warn!("Could not archive trajectory record: {}", e);
            }
            self.num_errors += 1;
        }
    }
}
