// src/store/memory.rs

//! In-memory store backend.
//!
//! Holds all rows in mutex-guarded vectors. Unlike the sqlite backend it
//! declares no uniqueness constraint on (faculty_id, code), so re-running
//! a program against it shows the documented course/lecture duplication.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::{
    Building, Course, Faculty, JobErrorEntry, JobStatus, NewCourse, NewLecture, Room, ScrapingJob,
    University,
};

use super::ScheduleStore;

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    universities: Vec<University>,
    faculties: Vec<Faculty>,
    courses: Vec<Course>,
    buildings: Vec<Building>,
    rooms: Vec<Room>,
    lectures: Vec<NewLecture>,
    jobs: Vec<ScrapingJob>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn job_mut(&mut self, job_id: i64) -> Result<&mut ScrapingJob> {
        self.jobs
            .iter_mut()
            .find(|j| j.id == job_id)
            .ok_or_else(|| AppError::validation(format!("no such job: {job_id}")))
    }
}

/// Constraint-free in-memory [`ScheduleStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all course rows, in insertion order.
    pub fn courses(&self) -> Vec<Course> {
        self.inner.lock().expect("store mutex").courses.clone()
    }

    /// Snapshot of all lecture rows, in insertion order.
    pub fn lectures(&self) -> Vec<NewLecture> {
        self.inner.lock().expect("store mutex").lectures.clone()
    }

    pub fn university_count(&self) -> usize {
        self.inner.lock().expect("store mutex").universities.len()
    }

    pub fn faculty_count(&self) -> usize {
        self.inner.lock().expect("store mutex").faculties.len()
    }

    pub fn building_count(&self) -> usize {
        self.inner.lock().expect("store mutex").buildings.len()
    }

    pub fn room_count(&self) -> usize {
        self.inner.lock().expect("store mutex").rooms.len()
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn find_or_create_university(
        &self,
        short_name: &str,
        name: &str,
        website: Option<&str>,
    ) -> Result<University> {
        let mut inner = self.inner.lock().expect("store mutex");
        if let Some(found) = inner.universities.iter().find(|u| u.short_name == short_name) {
            return Ok(found.clone());
        }
        let university = University {
            id: inner.next_id(),
            short_name: short_name.to_string(),
            name: name.to_string(),
            website: website.map(str::to_string),
        };
        inner.universities.push(university.clone());
        Ok(university)
    }

    async fn find_or_create_faculty(
        &self,
        university_id: i64,
        short_name: &str,
        name: &str,
    ) -> Result<Faculty> {
        let mut inner = self.inner.lock().expect("store mutex");
        if let Some(found) = inner
            .faculties
            .iter()
            .find(|f| f.university_id == university_id && f.short_name == short_name)
        {
            return Ok(found.clone());
        }
        let faculty = Faculty {
            id: inner.next_id(),
            university_id,
            short_name: short_name.to_string(),
            name: name.to_string(),
        };
        inner.faculties.push(faculty.clone());
        Ok(faculty)
    }

    async fn create_course(&self, course: &NewCourse) -> Result<Course> {
        let mut inner = self.inner.lock().expect("store mutex");
        let row = Course {
            id: inner.next_id(),
            faculty_id: course.faculty_id,
            code: course.code.clone(),
            name: course.name.clone(),
            credits: course.credits,
            semester: course.semester,
            level: course.level,
        };
        inner.courses.push(row.clone());
        Ok(row)
    }

    async fn find_or_create_building(&self, name: &str, address: &str) -> Result<Building> {
        let mut inner = self.inner.lock().expect("store mutex");
        if let Some(found) = inner.buildings.iter().find(|b| b.name == name) {
            return Ok(found.clone());
        }
        let building = Building {
            id: inner.next_id(),
            name: name.to_string(),
            address: address.to_string(),
        };
        inner.buildings.push(building.clone());
        Ok(building)
    }

    async fn find_or_create_room(&self, building_id: i64, number: &str) -> Result<Room> {
        let mut inner = self.inner.lock().expect("store mutex");
        if let Some(found) = inner
            .rooms
            .iter()
            .find(|r| r.building_id == building_id && r.number == number)
        {
            return Ok(found.clone());
        }
        let room = Room {
            id: inner.next_id(),
            building_id,
            number: number.to_string(),
        };
        inner.rooms.push(room.clone());
        Ok(room)
    }

    async fn insert_lecture(&self, lecture: &NewLecture) -> Result<i64> {
        let mut inner = self.inner.lock().expect("store mutex");
        let id = inner.next_id();
        inner.lectures.push(lecture.clone());
        Ok(id)
    }

    async fn create_job(&self, source: &str) -> Result<i64> {
        let mut inner = self.inner.lock().expect("store mutex");
        let id = inner.next_id();
        inner.jobs.push(ScrapingJob {
            id,
            source: source.to_string(),
            status: JobStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            records_processed: 0,
            errors: Vec::new(),
        });
        Ok(id)
    }

    async fn add_job_records(&self, job_id: i64, count: u32) -> Result<()> {
        let mut inner = self.inner.lock().expect("store mutex");
        let job = inner.job_mut(job_id)?;
        job.records_processed += u64::from(count);
        Ok(())
    }

    async fn append_job_error(&self, job_id: i64, message: &str) -> Result<()> {
        let mut inner = self.inner.lock().expect("store mutex");
        let job = inner.job_mut(job_id)?;
        job.errors.push(JobErrorEntry {
            timestamp: Utc::now(),
            message: message.to_string(),
        });
        Ok(())
    }

    async fn finalize_job(&self, job_id: i64, status: JobStatus) -> Result<()> {
        let mut inner = self.inner.lock().expect("store mutex");
        let job = inner.job_mut(job_id)?;
        job.status = status;
        job.completed_at = Some(Utc::now());
        Ok(())
    }

    async fn load_job(&self, job_id: i64) -> Result<ScrapingJob> {
        let inner = self.inner.lock().expect("store mutex");
        inner
            .jobs
            .iter()
            .find(|j| j.id == job_id)
            .cloned()
            .ok_or_else(|| AppError::validation(format!("no such job: {job_id}")))
    }
}
