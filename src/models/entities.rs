// src/models/entities.rs

//! Rows of the relational lecture store, as produced by the reconciler.
//!
//! University, Faculty, Building and Room are singletons per natural key
//! and resolved with find-or-create. Course is a plain create keyed on
//! (faculty_id, code); Lecture inserts are append-only.

use crate::models::schedule::{CourseLevel, LectureType, Semester};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct University {
    pub id: i64,
    pub short_name: String,
    pub name: String,
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Faculty {
    pub id: i64,
    pub university_id: i64,
    pub short_name: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: i64,
    pub faculty_id: i64,
    pub code: String,
    pub name: String,
    pub credits: u32,
    pub semester: Semester,
    pub level: CourseLevel,
}

/// Course attributes before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub faculty_id: i64,
    pub code: String,
    pub name: String,
    pub credits: u32,
    pub semester: Semester,
    pub level: CourseLevel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Building {
    pub id: i64,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: i64,
    pub building_id: i64,
    pub number: String,
}

/// Lecture attributes before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLecture {
    pub course_id: i64,
    pub lecture_type: LectureType,
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    pub room_id: Option<i64>,
    pub teacher: Option<String>,
}
