//! # Path statistics
//!
//! Summary statistics over a session's trajectory, accumulated record by record so they can be
//! fed from the trajectory log without keeping the whole path in memory.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;
use serde::Serialize;

use crate::traj_log::TrajLog;
use comms_if::tm::TrajRecord;
use util::maths::norm;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Path of the statistics file relative to the session root.
pub const PATH_STATS_FILE: &str = "path_stats.json";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Accumulator for path statistics.
#[derive(Debug, Clone, Default)]
pub struct PathStats {
    num_records: u64,

    first_timestamp: f64,
    last_record: Option<TrajRecord>,

    total_distance_m: f64,

    x_range_m: [f64; 2],
    y_range_m: [f64; 2],

    sum_abs_line_error: f64,
}

/// Statistics over a path.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct PathSummary {
    pub num_records: u64,

    /// Sum of the straight line distances between consecutive records
    ///
    /// Units: meters
    pub total_distance_m: f64,

    /// Time between the first and last records
    ///
    /// Units: seconds
    pub total_time_s: f64,

    /// Units: meters/second, zero if no time elapsed
    pub avg_speed_ms: f64,

    /// Minimum and maximum X position, `None` if there are no records
    pub x_range_m: Option<[f64; 2]>,

    /// Minimum and maximum Y position, `None` if there are no records
    pub y_range_m: Option<[f64; 2]>,

    /// Mean of the absolute line error, zero if there are no records
    pub mean_abs_line_error: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PathStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the statistics of a whole path at once.
    pub fn from_records(records: &[TrajRecord]) -> PathSummary {
        let mut stats = Self::new();
        for r in records {
            stats.push(r);
        }
        stats.summary()
    }

    /// Add the next record of the path.
    pub fn push(&mut self, record: &TrajRecord) {
        match self.last_record {
            Some(ref last) => {
                self.total_distance_m += norm(&[last.x, last.y], &[record.x, record.y])
                    .unwrap_or(0.0);

                self.x_range_m[0] = self.x_range_m[0].min(record.x);
                self.x_range_m[1] = self.x_range_m[1].max(record.x);
                self.y_range_m[0] = self.y_range_m[0].min(record.y);
                self.y_range_m[1] = self.y_range_m[1].max(record.y);
            },
            None => {
                self.first_timestamp = record.timestamp;
                self.x_range_m = [record.x, record.x];
                self.y_range_m = [record.y, record.y];
            }
        }

        self.sum_abs_line_error += record.line_error.abs();
        self.num_records += 1;
        self.last_record = Some(*record);
    }

    /// Get the summary of the path so far.
    pub fn summary(&self) -> PathSummary {
        let last = match self.last_record {
            Some(r) => r,
            None => return PathSummary::default()
        };

        let total_time_s = last.timestamp - self.first_timestamp;

        PathSummary {
            num_records: self.num_records,
            total_distance_m: self.total_distance_m,
            total_time_s,
            avg_speed_ms: if total_time_s > 0.0 {
                self.total_distance_m / total_time_s
            }
            else {
                0.0
            },
            x_range_m: Some(self.x_range_m),
            y_range_m: Some(self.y_range_m),
            mean_abs_line_error: self.sum_abs_line_error / self.num_records as f64,
        }
    }
}

impl TrajLog for PathStats {
    fn log(&mut self, record: &TrajRecord) {
        self.push(record);
    }
}

impl PathSummary {
    /// Log the summary at info level.
    pub fn log(&self) {
        info!("Path statistics:");
        info!("    Records:             {}", self.num_records);
        info!("    Total distance:      {:.3} m", self.total_distance_m);
        info!("    Total time:          {:.3} s", self.total_time_s);
        info!("    Average speed:       {:.3} m/s", self.avg_speed_ms);
        if let (Some(x), Some(y)) = (self.x_range_m, self.y_range_m) {
            info!("    X range:             [{:.3}, {:.3}] m", x[0], x[1]);
            info!("    Y range:             [{:.3}, {:.3}] m", y[0], y[1]);
        }
        info!("    Mean |line error|:   {:.3}", self.mean_abs_line_error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rec(timestamp: f64, x: f64, y: f64, line_error: f64) -> TrajRecord {
        TrajRecord {
            timestamp,
            x,
            y,
            line_error,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_path() {
        let summary = PathStats::from_records(&[]);

        assert_eq!(summary, PathSummary::default());
        assert_eq!(summary.x_range_m, None);
    }

    #[test]
    fn test_single_record_has_no_speed() {
        let summary = PathStats::from_records(&[rec(1.0, 2.0, 3.0, -0.5)]);

        assert_eq!(summary.num_records, 1);
        assert_eq!(summary.total_time_s, 0.0);
        assert_eq!(summary.avg_speed_ms, 0.0);
        assert_eq!(summary.x_range_m, Some([2.0, 2.0]));
        assert_eq!(summary.mean_abs_line_error, 0.5);
    }

    #[test]
    fn test_path_summary() {
        let summary = PathStats::from_records(&[
            rec(0.5, 0.0, 0.0, 0.0),
            rec(1.5, 3.0, 4.0, 0.5),
            rec(2.5, 3.0, -1.0, -1.0),
        ]);

        assert_eq!(summary.num_records, 3);
        assert_relative_eq!(summary.total_distance_m, 10.0);
        assert_relative_eq!(summary.total_time_s, 2.0);
        assert_relative_eq!(summary.avg_speed_ms, 5.0);
        assert_eq!(summary.x_range_m, Some([0.0, 3.0]));
        assert_eq!(summary.y_range_m, Some([-1.0, 4.0]));
        assert_relative_eq!(summary.mean_abs_line_error, 0.5);
    }
}
