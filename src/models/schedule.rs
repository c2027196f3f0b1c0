// src/models/schedule.rs

//! Data structures flowing through the scrape pipeline.

use serde::{Deserialize, Serialize};

/// A program discovered on the listing pages.
///
/// One program corresponds to one timetable detail page and, in the
/// current mapping, to exactly one synthesized course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgramRef {
    /// Numeric identifier extracted from the detail link
    pub id: String,

    /// Display name taken from the anchor text
    pub name: String,

    /// Canonical detail page URL
    pub detail_url: String,

    /// Canonical XLS export URL
    pub export_url: String,
}

/// Parser output for one program's detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedProgram {
    /// Separately parsed courses.
    ///
    /// Stays empty in the current mapping: the program itself becomes the
    /// single course and every lecture attaches to it.
    pub courses: Vec<ParsedCourse>,

    /// Valid lecture rows extracted from the schedule table
    pub lectures: Vec<ParsedLecture>,
}

/// A course parsed from markup. Unused by the current source mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCourse {
    pub code: String,
    pub name: String,
}

/// One normalized lecture row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLecture {
    /// Program id the row was parsed from
    pub course_code: String,

    /// Inferred lecture type
    pub lecture_type: LectureType,

    /// ISO day of week, Monday=1 through Friday=5
    pub day_of_week: u8,

    /// Zero-padded HH:MM start, strictly before `end_time`
    pub start_time: String,

    /// Zero-padded HH:MM end
    pub end_time: String,

    /// Room label, if the cell was non-empty
    pub room: Option<String>,

    /// Free-text teacher name, if the cell was non-empty
    pub teacher: Option<String>,
}

/// Lecture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LectureType {
    Lecture,
    Seminar,
    Exercise,
    Lab,
    Workshop,
    Other,
}

impl LectureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lecture => "LECTURE",
            Self::Seminar => "SEMINAR",
            Self::Exercise => "EXERCISE",
            Self::Lab => "LAB",
            Self::Workshop => "WORKSHOP",
            Self::Other => "OTHER",
        }
    }
}

/// Academic semester: winter (ZS) or summer (LS).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Semester {
    #[default]
    Zs,
    Ls,
}

impl Semester {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zs => "ZS",
            Self::Ls => "LS",
        }
    }
}

/// Study level of a course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CourseLevel {
    #[default]
    Bc,
    Mgr,
    Phd,
}

impl CourseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bc => "BC",
            Self::Mgr => "MGR",
            Self::Phd => "PHD",
        }
    }
}
