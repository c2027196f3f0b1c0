// src/services/reconcile.rs

//! Schedule reconciliation against the relational store.
//!
//! Maps one parsed program onto the store's natural keys: University and
//! Faculty are resolved with find-or-create, the program becomes one
//! course (a plain create), and each valid lecture row is inserted after
//! resolving its room. A failure on one lecture does not abort the rest
//! of the program; failures are collected for the orchestrator's job log.

use crate::error::{AppError, Result};
use crate::models::{NewCourse, NewLecture, ParsedLecture, ParsedProgram, ProgramRef, SourceProfile};
use crate::store::ScheduleStore;

/// Per-program reconciliation tally.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    /// Lecture rows written for this program
    pub lectures_written: u32,

    /// Per-lecture failures that did not abort the program
    pub failures: Vec<AppError>,
}

/// Writes parsed programs into a [`ScheduleStore`].
pub struct Reconciler<'a> {
    store: &'a dyn ScheduleStore,
    source: &'a SourceProfile,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn ScheduleStore, source: &'a SourceProfile) -> Self {
        Self { store, source }
    }

    /// Reconcile one parsed program.
    ///
    /// University, faculty and course resolution errors abort the whole
    /// program (notably the natural-key violation on a course re-create,
    /// which must fail loudly). Per-lecture errors are collected into the
    /// outcome instead.
    pub async fn reconcile(
        &self,
        parsed: &ParsedProgram,
        program: &ProgramRef,
    ) -> Result<ReconcileOutcome> {
        let university = self
            .store
            .find_or_create_university(
                &self.source.university.short_name,
                &self.source.university.name,
                self.source.university.website.as_deref(),
            )
            .await?;

        let faculty = self
            .store
            .find_or_create_faculty(
                university.id,
                &self.source.faculty.short_name,
                &self.source.faculty.name,
            )
            .await?;

        let course = self
            .store
            .create_course(&NewCourse {
                faculty_id: faculty.id,
                code: self.source.course_code(&program.id),
                name: program.name.clone(),
                credits: self.source.course_defaults.credits,
                semester: self.source.course_defaults.semester,
                level: self.source.course_defaults.level,
            })
            .await?;

        let mut outcome = ReconcileOutcome::default();
        for lecture in &parsed.lectures {
            match self.write_lecture(course.id, lecture).await {
                Ok(()) => outcome.lectures_written += 1,
                Err(e) => outcome.failures.push(e),
            }
        }

        log::debug!(
            "Program {}: wrote {} lectures ({} failed)",
            program.id,
            outcome.lectures_written,
            outcome.failures.len()
        );
        Ok(outcome)
    }

    async fn write_lecture(&self, course_id: i64, lecture: &ParsedLecture) -> Result<()> {
        let room_id = match &lecture.room {
            Some(number) => {
                let building = self
                    .store
                    .find_or_create_building(
                        &self.source.building.name,
                        &self.source.building.address,
                    )
                    .await?;
                let room = self.store.find_or_create_room(building.id, number).await?;
                Some(room.id)
            }
            None => None,
        };

        self.store
            .insert_lecture(&NewLecture {
                course_id,
                lecture_type: lecture.lecture_type,
                day_of_week: lecture.day_of_week,
                start_time: lecture.start_time.clone(),
                end_time: lecture.end_time.clone(),
                room_id,
                teacher: lecture.teacher.clone(),
            })
            .await?;
        Ok(())
    }
}
