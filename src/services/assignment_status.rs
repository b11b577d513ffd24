// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side assignment status derivation.
//!
//! A submission always wins over the deadline: a late-but-submitted
//! assignment is `Submitted`, never `Overdue`.

use crate::models::{Assignment, AssignmentStatus, Submission, TrackedAssignment};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Status of one assignment given its matching submission (if any).
pub fn status_for(
    assignment: &Assignment,
    submission: Option<&Submission>,
    now: DateTime<Utc>,
) -> AssignmentStatus {
    if submission.is_some() {
        AssignmentStatus::Submitted
    } else if now > assignment.due_date {
        AssignmentStatus::Overdue
    } else {
        AssignmentStatus::InProgress
    }
}

/// Join assignments with submissions on `assignment_id` and derive status.
///
/// Output order follows `assignments`. If several submissions share an
/// assignment, the first in `submissions` supplies the `submission_id`.
pub fn derive_statuses(
    assignments: Vec<Assignment>,
    submissions: &[Submission],
    now: DateTime<Utc>,
) -> Vec<TrackedAssignment> {
    let mut by_assignment: HashMap<i64, &Submission> = HashMap::with_capacity(submissions.len());
    for submission in submissions {
        by_assignment
            .entry(submission.assignment_id)
            .or_insert(submission);
    }

    assignments
        .into_iter()
        .map(|assignment| {
            let submission = by_assignment.get(&assignment.assignment_id).copied();
            let status = status_for(&assignment, submission, now);
            TrackedAssignment {
                assignment,
                status,
                submitted: submission.is_some(),
                submission_id: submission.map(|s| s.submission_id),
            }
        })
        .collect()
}
