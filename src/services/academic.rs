// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Academic data store.
//!
//! Handles:
//! - Student record, courses and transcript reads
//! - Course catalogue and enrollment
//! - Assignment loading with client-side status derivation
//! - Submission upload and download

use crate::error::{PortalError, Result};
use crate::models::{
    Assignment, Course, Download, EnrolledCourse, StudentDetail, Submission, TrackedAssignment,
    TranscriptEntry, UploadFile,
};
use crate::services::api::PortalClient;
use crate::services::assignment_status::derive_statuses;
use chrono::Utc;
use futures_util::{stream, StreamExt, TryStreamExt};

/// Upper bound on concurrent per-course assignment requests.
const MAX_CONCURRENT_COURSE_FETCHES: usize = 8;

/// Reads and writes academic data for the selected student.
#[derive(Clone)]
pub struct AcademicStore {
    client: PortalClient,
    current_student_id: Option<i64>,
}

impl AcademicStore {
    pub fn new(client: PortalClient) -> Self {
        Self {
            client,
            current_student_id: None,
        }
    }

    /// Select whose data the student-scoped reads fetch.
    pub fn set_current_student(&mut self, student_id: i64) {
        self.current_student_id = Some(student_id);
    }

    pub fn current_student_id(&self) -> Option<i64> {
        self.current_student_id
    }

    fn student_id(&self) -> Result<i64> {
        self.current_student_id
            .ok_or(PortalError::StudentNotSelected)
    }

    pub async fn get_student_info(&self) -> Result<StudentDetail> {
        let id = self.student_id()?;
        self.client
            .get_student(id)
            .await
            .map_err(|e| PortalError::request("Failed to load student information", e))
    }

    /// Enrolled courses, taken from the student record.
    pub async fn get_student_courses(&self) -> Result<Vec<EnrolledCourse>> {
        let id = self.student_id()?;
        self.client
            .get_student(id)
            .await
            .map(|detail| detail.courses)
            .map_err(|e| PortalError::request("Failed to load student courses", e))
    }

    pub async fn get_all_courses(&self) -> Result<Vec<Course>> {
        self.client
            .list_courses()
            .await
            .map_err(|e| PortalError::request("Failed to load courses", e))
    }

    pub async fn get_student_transcript(&self) -> Result<Vec<TranscriptEntry>> {
        let id = self.student_id()?;
        self.client
            .get_transcript(id)
            .await
            .map_err(|e| PortalError::request("Failed to load transcript", e))
    }

    pub async fn get_student_submissions(&self) -> Result<Vec<Submission>> {
        self.client
            .my_submissions()
            .await
            .map_err(|e| PortalError::request("Failed to load submissions", e))
    }

    /// Enroll the logged-in student in `course_id`.
    pub async fn enroll_course(&self, course_id: i64) -> Result<()> {
        self.client.enroll(course_id).await.map_err(|e| {
            tracing::warn!(course_id, error = %e, "Enrollment failed");
            PortalError::with_detail(&e, "Course enrollment failed")
        })?;

        tracing::info!(course_id, "Enrolled in course");
        Ok(())
    }

    /// All assignments across the student's courses, with derived status.
    ///
    /// Any failing step fails the whole call; partial results are dropped.
    pub async fn get_student_assignments(&self) -> Result<Vec<TrackedAssignment>> {
        // Reported as-is; no request is made without a selected student
        self.student_id()?;
        self.load_assignments().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to load assignments");
            PortalError::Aggregate(e.to_string())
        })
    }

    async fn load_assignments(&self) -> Result<Vec<TrackedAssignment>> {
        // 1. Courses
        let courses = self.get_student_courses().await?;

        // 2. One request per course. try_collect stops at the first error and
        //    drops the stream, cancelling requests still in flight.
        let per_course: Vec<Vec<Assignment>> = stream::iter(courses.iter().map(|c| c.course_id))
            .map(|course_id| self.client.course_assignments(course_id))
            .buffered(MAX_CONCURRENT_COURSE_FETCHES)
            .try_collect()
            .await
            .map_err(|e| PortalError::request("Failed to load course assignments", e))?;

        // 3. Flatten in course order
        let assignments: Vec<_> = per_course.into_iter().flatten().collect();

        // 4. Submissions, once
        let submissions = self.get_student_submissions().await?;

        tracing::debug!(
            courses = courses.len(),
            assignments = assignments.len(),
            submissions = submissions.len(),
            "Deriving assignment status"
        );

        // 5. Derive
        Ok(derive_statuses(assignments, &submissions, Utc::now()))
    }

    /// Upload `file` as a submission for `assignment_id`.
    pub async fn submit_assignment(
        &self,
        assignment_id: i64,
        file: UploadFile,
    ) -> Result<Submission> {
        let file_name = file.file_name.clone();
        let submission = self
            .client
            .submit_assignment(assignment_id, file)
            .await
            .map_err(|e| {
                tracing::warn!(assignment_id, error = %e, "Submission failed");
                PortalError::with_detail(&e, "Assignment submission failed")
            })?;

        tracing::info!(
            assignment_id,
            submission_id = submission.submission_id,
            file = %file_name,
            "Assignment submitted"
        );
        Ok(submission)
    }

    /// Fetch a submitted file's content.
    pub async fn download_submission(&self, submission_id: i64) -> Result<Download> {
        self.client
            .download_submission(submission_id)
            .await
            .map_err(|e| PortalError::request("Failed to download submission", e))
    }
}
