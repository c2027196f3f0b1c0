// src/models/mod.rs

//! Domain models for the scraper application.

mod config;
mod entities;
mod job;
mod schedule;

pub use config::{
    BuildingInfo, Config, CourseDefaults, DatabaseConfig, InstitutionInfo, ScraperConfig,
    SourceProfile,
};
pub use entities::{Building, Course, Faculty, NewCourse, NewLecture, Room, University};
pub use job::{JobErrorEntry, JobStatus, ScrapingJob};
pub use schedule::{
    CourseLevel, LectureType, ParsedCourse, ParsedLecture, ParsedProgram, ProgramRef, Semester,
};
