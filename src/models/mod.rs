// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the portal API.

pub mod assignment;
pub mod course;
pub mod user;

pub use assignment::{
    Assignment, AssignmentStatus, Download, Submission, TrackedAssignment, UploadFile,
};
pub use course::{ClassInfo, Course, EnrolledCourse, StudentDetail, TranscriptEntry};
pub use user::{Credential, CurrentUser, Role, RoleDetails, SignupForm, UserProfile};
