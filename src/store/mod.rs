// src/store/mod.rs

//! Relational store abstraction for schedule reconciliation.
//!
//! The reconciler and orchestrator only ever talk to [`ScheduleStore`]:
//! find-or-create on the natural-keyed entities, a plain create for
//! courses, append-only lecture inserts and the scraping-job bookkeeping
//! operations. Backends:
//!
//! - [`SqliteStore`]: production backend with natural-key UNIQUE
//!   constraints, so a duplicate course create fails loudly.
//! - [`MemoryStore`]: constraint-free in-memory backend for tests and
//!   dry runs.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Building, Course, Faculty, JobStatus, NewCourse, NewLecture, Room, ScrapingJob, University,
};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Persistence operations required by the scrape pipeline.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Resolve a university by its unique short name, creating it on
    /// first reference.
    async fn find_or_create_university(
        &self,
        short_name: &str,
        name: &str,
        website: Option<&str>,
    ) -> Result<University>;

    /// Resolve a faculty by (university_id, short_name), creating it on
    /// first reference.
    async fn find_or_create_faculty(
        &self,
        university_id: i64,
        short_name: &str,
        name: &str,
    ) -> Result<Faculty>;

    /// Create a course row. This is a create, not an upsert: a backend
    /// enforcing the (faculty_id, code) natural key rejects a re-run.
    async fn create_course(&self, course: &NewCourse) -> Result<Course>;

    /// Resolve a building by name, creating it on first reference.
    async fn find_or_create_building(&self, name: &str, address: &str) -> Result<Building>;

    /// Resolve a room by (building_id, number), creating it on first
    /// reference.
    async fn find_or_create_room(&self, building_id: i64, number: &str) -> Result<Room>;

    /// Insert a lecture row. Append-only: re-runs duplicate lectures.
    async fn insert_lecture(&self, lecture: &NewLecture) -> Result<i64>;

    /// Create a job row in `running` state with `started_at = now`.
    async fn create_job(&self, source: &str) -> Result<i64>;

    /// Add to the job's processed-records counter.
    async fn add_job_records(&self, job_id: i64, count: u32) -> Result<()>;

    /// Append a timestamped entry to the job's error log.
    async fn append_job_error(&self, job_id: i64, message: &str) -> Result<()>;

    /// Finalize the job: set terminal status and `completed_at = now`.
    async fn finalize_job(&self, job_id: i64, status: JobStatus) -> Result<()>;

    /// Load a job row with its error log.
    async fn load_job(&self, job_id: i64) -> Result<ScrapingJob>;
}
