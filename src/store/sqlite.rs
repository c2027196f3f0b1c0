// src/store/sqlite.rs

//! sqlite store backend.
//!
//! The schema carries the natural-key UNIQUE constraints from the data
//! model, so a duplicate course create surfaces as a store error instead
//! of silently overwriting. Timestamps are stored as RFC 3339 text and
//! the job error log as a JSON column.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};

use crate::error::{AppError, Result};
use crate::models::{
    Building, Course, Faculty, JobErrorEntry, JobStatus, NewCourse, NewLecture, Room, ScrapingJob,
    University,
};

use super::ScheduleStore;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS universities (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    short_name  TEXT NOT NULL UNIQUE,
    name        TEXT NOT NULL,
    website     TEXT
);

CREATE TABLE IF NOT EXISTS faculties (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    university_id INTEGER NOT NULL REFERENCES universities(id),
    short_name    TEXT NOT NULL,
    name          TEXT NOT NULL,
    UNIQUE (university_id, short_name)
);

CREATE TABLE IF NOT EXISTS courses (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    faculty_id INTEGER NOT NULL REFERENCES faculties(id),
    code       TEXT NOT NULL,
    name       TEXT NOT NULL,
    credits    INTEGER NOT NULL,
    semester   TEXT NOT NULL,
    level      TEXT NOT NULL,
    UNIQUE (faculty_id, code)
);

CREATE TABLE IF NOT EXISTS buildings (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT NOT NULL UNIQUE,
    address TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS rooms (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    building_id INTEGER NOT NULL REFERENCES buildings(id),
    number      TEXT NOT NULL,
    UNIQUE (building_id, number)
);

CREATE TABLE IF NOT EXISTS lectures (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    course_id   INTEGER NOT NULL REFERENCES courses(id),
    type        TEXT NOT NULL,
    day_of_week INTEGER NOT NULL,
    start_time  TEXT NOT NULL,
    end_time    TEXT NOT NULL,
    room_id     INTEGER REFERENCES rooms(id),
    teacher     TEXT
);

CREATE TABLE IF NOT EXISTS scraping_jobs (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    source            TEXT NOT NULL,
    status            TEXT NOT NULL,
    started_at        TEXT NOT NULL,
    completed_at      TEXT,
    records_processed INTEGER NOT NULL DEFAULT 0,
    errors            TEXT NOT NULL DEFAULT '[]'
);
"#;

/// sqlite-backed [`ScheduleStore`].
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to the database and bootstrap the schema.
    ///
    /// The pool is capped at one connection: the pipeline is sequential
    /// and concurrent scraper runs are unsupported.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await?;
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| AppError::validation(format!("bad timestamp '{raw}': {e}")))
    }

    fn job_from_row(row: &SqliteRow) -> Result<ScrapingJob> {
        let status_raw: String = row.try_get("status")?;
        let status = JobStatus::parse(&status_raw)
            .ok_or_else(|| AppError::validation(format!("bad job status '{status_raw}'")))?;
        let started_raw: String = row.try_get("started_at")?;
        let completed_raw: Option<String> = row.try_get("completed_at")?;
        let errors_raw: String = row.try_get("errors")?;
        let errors: Vec<JobErrorEntry> = serde_json::from_str(&errors_raw)?;
        let records: i64 = row.try_get("records_processed")?;

        Ok(ScrapingJob {
            id: row.try_get("id")?,
            source: row.try_get("source")?,
            status,
            started_at: Self::parse_timestamp(&started_raw)?,
            completed_at: completed_raw
                .as_deref()
                .map(Self::parse_timestamp)
                .transpose()?,
            records_processed: records.max(0) as u64,
            errors,
        })
    }

    async fn load_job_errors(&self, job_id: i64) -> Result<Vec<JobErrorEntry>> {
        let row = sqlx::query("SELECT errors FROM scraping_jobs WHERE id = ?1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::validation(format!("no such job: {job_id}")))?;
        let raw: String = row.try_get("errors")?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[async_trait]
impl ScheduleStore for SqliteStore {
    async fn find_or_create_university(
        &self,
        short_name: &str,
        name: &str,
        website: Option<&str>,
    ) -> Result<University> {
        let existing = sqlx::query(
            "SELECT id, short_name, name, website FROM universities WHERE short_name = ?1",
        )
        .bind(short_name)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = existing {
            return Ok(University {
                id: row.try_get("id")?,
                short_name: row.try_get("short_name")?,
                name: row.try_get("name")?,
                website: row.try_get("website")?,
            });
        }

        let result =
            sqlx::query("INSERT INTO universities (short_name, name, website) VALUES (?1, ?2, ?3)")
                .bind(short_name)
                .bind(name)
                .bind(website)
                .execute(&self.pool)
                .await?;

        Ok(University {
            id: result.last_insert_rowid(),
            short_name: short_name.to_string(),
            name: name.to_string(),
            website: website.map(str::to_string),
        })
    }

    async fn find_or_create_faculty(
        &self,
        university_id: i64,
        short_name: &str,
        name: &str,
    ) -> Result<Faculty> {
        let existing = sqlx::query(
            "SELECT id, university_id, short_name, name FROM faculties \
             WHERE university_id = ?1 AND short_name = ?2",
        )
        .bind(university_id)
        .bind(short_name)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = existing {
            return Ok(Faculty {
                id: row.try_get("id")?,
                university_id: row.try_get("university_id")?,
                short_name: row.try_get("short_name")?,
                name: row.try_get("name")?,
            });
        }

        let result =
            sqlx::query("INSERT INTO faculties (university_id, short_name, name) VALUES (?1, ?2, ?3)")
                .bind(university_id)
                .bind(short_name)
                .bind(name)
                .execute(&self.pool)
                .await?;

        Ok(Faculty {
            id: result.last_insert_rowid(),
            university_id,
            short_name: short_name.to_string(),
            name: name.to_string(),
        })
    }

    async fn create_course(&self, course: &NewCourse) -> Result<Course> {
        // Plain INSERT: the UNIQUE (faculty_id, code) constraint rejects
        // a re-run for the same program.
        let result = sqlx::query(
            "INSERT INTO courses (faculty_id, code, name, credits, semester, level) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(course.faculty_id)
        .bind(&course.code)
        .bind(&course.name)
        .bind(i64::from(course.credits))
        .bind(course.semester.as_str())
        .bind(course.level.as_str())
        .execute(&self.pool)
        .await?;

        Ok(Course {
            id: result.last_insert_rowid(),
            faculty_id: course.faculty_id,
            code: course.code.clone(),
            name: course.name.clone(),
            credits: course.credits,
            semester: course.semester,
            level: course.level,
        })
    }

    async fn find_or_create_building(&self, name: &str, address: &str) -> Result<Building> {
        let existing = sqlx::query("SELECT id, name, address FROM buildings WHERE name = ?1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = existing {
            return Ok(Building {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                address: row.try_get("address")?,
            });
        }

        let result = sqlx::query("INSERT INTO buildings (name, address) VALUES (?1, ?2)")
            .bind(name)
            .bind(address)
            .execute(&self.pool)
            .await?;

        Ok(Building {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            address: address.to_string(),
        })
    }

    async fn find_or_create_room(&self, building_id: i64, number: &str) -> Result<Room> {
        let existing = sqlx::query(
            "SELECT id, building_id, number FROM rooms WHERE building_id = ?1 AND number = ?2",
        )
        .bind(building_id)
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = existing {
            return Ok(Room {
                id: row.try_get("id")?,
                building_id: row.try_get("building_id")?,
                number: row.try_get("number")?,
            });
        }

        let result = sqlx::query("INSERT INTO rooms (building_id, number) VALUES (?1, ?2)")
            .bind(building_id)
            .bind(number)
            .execute(&self.pool)
            .await?;

        Ok(Room {
            id: result.last_insert_rowid(),
            building_id,
            number: number.to_string(),
        })
    }

    async fn insert_lecture(&self, lecture: &NewLecture) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO lectures (course_id, type, day_of_week, start_time, end_time, room_id, teacher) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(lecture.course_id)
        .bind(lecture.lecture_type.as_str())
        .bind(i64::from(lecture.day_of_week))
        .bind(&lecture.start_time)
        .bind(&lecture.end_time)
        .bind(lecture.room_id)
        .bind(lecture.teacher.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn create_job(&self, source: &str) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO scraping_jobs (source, status, started_at, records_processed, errors) \
             VALUES (?1, ?2, ?3, 0, '[]')",
        )
        .bind(source)
        .bind(JobStatus::Running.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn add_job_records(&self, job_id: i64, count: u32) -> Result<()> {
        let result = sqlx::query(
            "UPDATE scraping_jobs SET records_processed = records_processed + ?1 WHERE id = ?2",
        )
        .bind(i64::from(count))
        .bind(job_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::validation(format!("no such job: {job_id}")));
        }
        Ok(())
    }

    async fn append_job_error(&self, job_id: i64, message: &str) -> Result<()> {
        let mut errors = self.load_job_errors(job_id).await?;
        errors.push(JobErrorEntry {
            timestamp: Utc::now(),
            message: message.to_string(),
        });
        let encoded = serde_json::to_string(&errors)?;

        sqlx::query("UPDATE scraping_jobs SET errors = ?1 WHERE id = ?2")
            .bind(encoded)
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn finalize_job(&self, job_id: i64, status: JobStatus) -> Result<()> {
        let result =
            sqlx::query("UPDATE scraping_jobs SET status = ?1, completed_at = ?2 WHERE id = ?3")
                .bind(status.as_str())
                .bind(Utc::now().to_rfc3339())
                .bind(job_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::validation(format!("no such job: {job_id}")));
        }
        Ok(())
    }

    async fn load_job(&self, job_id: i64) -> Result<ScrapingJob> {
        let row = sqlx::query(
            "SELECT id, source, status, started_at, completed_at, records_processed, errors \
             FROM scraping_jobs WHERE id = ?1",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::validation(format!("no such job: {job_id}")))?;

        Self::job_from_row(&row)
    }
}
