//! User, credential and registration models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Opaque bearer token proving an authenticated session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token, for the `Authorization` header and persistence only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Account role resolved from the profile flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Identity kept in the session (persisted under the `user` key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub user_id: i64,
}

/// `POST /token` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// `GET /users/me` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub is_student: bool,
    #[serde(default)]
    pub is_teacher: bool,
    #[serde(default)]
    pub email: Option<String>,
}

impl CurrentUser {
    /// The role, when the flags identify exactly one.
    pub fn role(&self) -> Option<Role> {
        match (self.is_student, self.is_teacher) {
            (true, false) => Some(Role::Student),
            (false, true) => Some(Role::Teacher),
            _ => None,
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            username: self.username.clone(),
            user_id: self.user_id,
        }
    }
}

/// Account embedded in backend student/teacher records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUser {
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Role-specific registration fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleDetails {
    Student { grade: String, major: String },
    Teacher { title: String, department: String },
}

impl RoleDetails {
    pub fn role(&self) -> Role {
        match self {
            RoleDetails::Student { .. } => Role::Student,
            RoleDetails::Teacher { .. } => Role::Teacher,
        }
    }
}

/// Registration form as entered by the user.
#[derive(Debug, Clone, Validate)]
pub struct SignupForm {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(must_match(other = "password"))]
    pub confirm_password: String,
    #[validate(length(min = 1))]
    pub email: String,
    pub details: RoleDetails,
}

impl SignupForm {
    /// Fields that must be non-empty before anything is sent.
    pub const REQUIRED_FIELDS: [&'static str; 3] = ["username", "password", "email"];

    pub fn new_user(&self) -> NewUser {
        NewUser {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

/// Nested `user` object of a registration payload.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// `POST /stu/students/` body.
#[derive(Debug, Clone, Serialize)]
pub struct StudentSignup {
    pub grade: String,
    pub major: String,
    pub user: NewUser,
}

/// `POST /tea/teachers/` body.
#[derive(Debug, Clone, Serialize)]
pub struct TeacherSignup {
    pub title: String,
    pub department: String,
    pub user: NewUser,
}

/// Created student record.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredStudent {
    pub student_id: i64,
    pub user: AccountUser,
}

/// Created teacher record.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredTeacher {
    pub teacher_id: i64,
    pub user: AccountUser,
}
