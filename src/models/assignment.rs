// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Assignment and submission models.

use crate::time_utils::{deserialize_optional_timestamp, deserialize_timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Assignment as published for a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub assignment_id: i64,
    /// Deadline. The backend calls this `deadline`.
    #[serde(alias = "deadline", deserialize_with = "deserialize_timestamp")]
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub teacher_id: Option<i64>,
    /// Free-form status set by the teacher, unrelated to [`AssignmentStatus`].
    #[serde(
        default,
        rename(deserialize = "status", serialize = "backend_status")
    )]
    pub backend_status: Option<String>,
}

/// Client-derived assignment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    InProgress,
    Submitted,
    Overdue,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::InProgress => "in_progress",
            AssignmentStatus::Submitted => "submitted",
            AssignmentStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assignment joined with the student's submissions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedAssignment {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub status: AssignmentStatus,
    pub submitted: bool,
    pub submission_id: Option<i64>,
}

/// Submission record (`GET /submissions/my`, `POST /assignments/{id}/submit`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub submission_id: i64,
    pub assignment_id: i64,
    #[serde(default)]
    pub student_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub submit_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub file_path: String,
}

/// File to upload as an assignment submission.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read a file from disk, keeping its base name.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self { file_name, bytes })
    }
}

/// Downloaded submission content. Saving or displaying it is up to the caller.
#[derive(Debug, Clone)]
pub struct Download {
    /// From `Content-Disposition`, when the backend sent one.
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}
