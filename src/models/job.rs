// src/models/job.rs

//! Scraping job bookkeeping structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a scraping job.
///
/// `pending → running → {completed | failed}`. A job left in `running`
/// by a killed process is not reconciled here; callers must treat it as
/// stale after a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// One entry in a job's error log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobErrorEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// One end-to-end run of the pipeline, as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapingJob {
    pub id: i64,
    /// Scraper identifier (source profile id)
    pub source: String,
    pub status: JobStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Monotonically incremented count of lectures written
    pub records_processed: u64,
    /// Ordered per-item error entries
    pub errors: Vec<JobErrorEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trip() {
        for status in [
            JobStatus::Pending,
            JobStatus::Running,
            JobStatus::Completed,
            JobStatus::Failed,
        ] {
            assert_eq!(JobStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(JobStatus::parse("stalled"), None);
    }
}
