//! Course and student records returned by the backend.

use crate::models::user::AccountUser;
use serde::{Deserialize, Serialize};

/// Course in the public catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub course_id: i64,
    pub course_name: String,
    #[serde(default)]
    pub credit: i64,
}

/// Course a student is enrolled in, with the grade if one was recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrolledCourse {
    pub course_id: i64,
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub credit: i64,
    #[serde(default)]
    pub grade: Option<f64>,
}

/// Transcript rows share the enrolled-course shape.
pub type TranscriptEntry = EnrolledCourse;

/// Administrative class membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub class_id: i64,
    pub class_name: String,
    #[serde(default)]
    pub grade: String,
}

/// `GET /students/{id}` response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StudentDetail {
    pub student_id: i64,
    /// Year of study
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub major: String,
    pub user: AccountUser,
    #[serde(default)]
    pub classes: Vec<ClassInfo>,
    #[serde(default)]
    pub courses: Vec<EnrolledCourse>,
}
