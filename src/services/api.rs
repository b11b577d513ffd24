// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Portal REST API client.
//!
//! One typed method per backend endpoint. Requests that act on behalf of the
//! logged-in user get their bearer token from the [`BearerAuth`] interceptor
//! at call time; only the profile lookup takes an explicit credential.

use crate::config::Config;
use crate::middleware::BearerAuth;
use crate::models::assignment::{Assignment, Download, Submission, UploadFile};
use crate::models::course::{Course, StudentDetail, TranscriptEntry};
use crate::models::user::{
    Credential, CurrentUser, RegisteredStudent, RegisteredTeacher, StudentSignup, TeacherSignup,
    TokenResponse,
};
use crate::services::session::SessionContext;
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_DISPOSITION};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

/// Transport-level failure of a single API call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// No response: connection refused, DNS, timeout, TLS.
    #[error("request failed: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status { status: u16, detail: Option<String> },

    /// The body did not match the expected schema.
    #[error("unexpected response body: {0}")]
    Parse(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Backend-supplied error message, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// FastAPI error body. `detail` is a string for `HTTPException` and a list
/// for request validation failures.
#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Portal API client.
#[derive(Clone)]
pub struct PortalClient {
    http: reqwest::Client,
    base_url: String,
    auth: BearerAuth,
}

impl PortalClient {
    /// Create a client whose authorized calls read credentials from `session`.
    pub fn new(config: &Config, session: SessionContext) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .default_headers(headers)
            .user_agent(concat!("campus-portal/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed building portal HTTP client")?;

        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            auth: BearerAuth::new(session),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ─── Session ─────────────────────────────────────────────────────────

    /// Exchange username and password for a bearer token (OAuth2 password grant).
    pub async fn request_token(
        &self,
        username: &str,
        password: &str,
    ) -> Result<TokenResponse, ApiError> {
        let response = self
            .http
            .post(self.url("/token"))
            .form(&[
                ("username", username),
                ("password", password),
                ("grant_type", "password"),
            ])
            .send()
            .await
            .map_err(|e| ApiError::Network(format!("Token request failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Get the profile behind an explicit credential.
    pub async fn current_user(&self, credential: &Credential) -> Result<CurrentUser, ApiError> {
        let response = self
            .http
            .get(self.url("/users/me"))
            .bearer_auth(credential.expose())
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Register a student account.
    pub async fn create_student(
        &self,
        payload: &StudentSignup,
    ) -> Result<RegisteredStudent, ApiError> {
        let request = self.http.post(self.url("/stu/students/")).json(payload);
        self.send_anonymous_json(request).await
    }

    /// Register a teacher account.
    pub async fn create_teacher(
        &self,
        payload: &TeacherSignup,
    ) -> Result<RegisteredTeacher, ApiError> {
        let request = self.http.post(self.url("/tea/teachers/")).json(payload);
        self.send_anonymous_json(request).await
    }

    // ─── Academic data ───────────────────────────────────────────────────

    /// Get a student record including classes and enrolled courses.
    pub async fn get_student(&self, student_id: i64) -> Result<StudentDetail, ApiError> {
        self.get_json(&format!("/students/{}", student_id)).await
    }

    pub async fn get_transcript(&self, student_id: i64) -> Result<Vec<TranscriptEntry>, ApiError> {
        self.get_json(&format!("/students/{}/transcript", student_id))
            .await
    }

    /// List the whole course catalogue.
    pub async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.get_json("/courses").await
    }

    pub async fn course_assignments(&self, course_id: i64) -> Result<Vec<Assignment>, ApiError> {
        self.get_json(&format!("/courses/{}/assignments", course_id))
            .await
    }

    /// Enroll the logged-in student. The backend identifies the student by token.
    pub async fn enroll(&self, course_id: i64) -> Result<(), ApiError> {
        let request = self
            .auth
            .apply(self.http.post(self.url(&format!("/courses/{}/enroll", course_id))))
            .await;
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        self.check_response(response).await?;
        Ok(())
    }

    /// List the logged-in student's submissions.
    pub async fn my_submissions(&self) -> Result<Vec<Submission>, ApiError> {
        self.get_json("/submissions/my").await
    }

    /// Upload a file as multipart field `file`.
    pub async fn submit_assignment(
        &self,
        assignment_id: i64,
        file: UploadFile,
    ) -> Result<Submission, ApiError> {
        let size = file.bytes.len();
        let part = Part::bytes(file.bytes).file_name(file.file_name);
        let form = Form::new().part("file", part);

        tracing::debug!(assignment_id, size, "Uploading submission");

        let request = self
            .http
            .post(self.url(&format!("/assignments/{}/submit", assignment_id)))
            .multipart(form);
        self.send_json(request).await
    }

    /// Fetch the raw bytes of a submitted file.
    pub async fn download_submission(&self, submission_id: i64) -> Result<Download, ApiError> {
        let request = self
            .http
            .get(self.url(&format!("/submissions/download/{}", submission_id)));
        let response = self
            .auth
            .apply(request)
            .await
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let response = self.check_response(response).await?;
        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(attachment_file_name);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(format!("Download interrupted: {}", e)))?;

        Ok(Download {
            file_name,
            bytes: bytes.to_vec(),
        })
    }

    // ─── Helpers ─────────────────────────────────────────────────────────

    /// Authorized GET request with JSON response.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(self.http.get(self.url(path))).await
    }

    /// Attach the session credential, send, and parse JSON.
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self
            .auth
            .apply(request)
            .await
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Send without the session credential and parse JSON.
    async fn send_anonymous_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body);

        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), body = %body, "Portal API server error");
        } else {
            tracing::debug!(status = status.as_u16(), detail = ?detail, "Portal API rejected request");
        }

        Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        })
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, ApiError> {
        let response = self.check_response(response).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(format!("Response body interrupted: {}", e)))?;

        serde_json::from_slice(&body).map_err(|e| ApiError::Parse(format!("JSON parse error: {}", e)))
    }
}

/// Pull `detail` out of a FastAPI error body.
fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// `attachment; filename="report.pdf"` -> `report.pdf`
///
/// Only the final path component is kept, so a name such as `../../x` or
/// `/etc/x` can never point outside the directory the caller saves into.
fn attachment_file_name(header: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|param| {
        let value = param.strip_prefix("filename=")?;
        let value = value.trim_matches('"').replace('\\', "/");
        let name = Path::new(&value).file_name()?.to_str()?;
        (!name.is_empty() && name != "." && name != "..").then(|| name.to_string())
    })
}
