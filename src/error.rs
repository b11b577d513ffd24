// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types with user-presentable messages.
//!
//! Transport failures are captured as [`ApiError`] by the API client and
//! never escape the stores; every store operation re-signals a
//! [`PortalError`] instead.

use crate::db::StorageError;
use crate::services::api::ApiError;

/// User-facing error returned by every store operation.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Server error, please try again later")]
    ServerError,

    #[error("Login failed, please check your network connection")]
    NetworkError,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BackendDetail(String),

    #[error("{0}")]
    GenericFailure(String),

    #[error("Unable to fetch user information")]
    ProfileFetch,

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("No student selected")]
    StudentNotSelected,

    #[error("{message}")]
    Request {
        message: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("Failed to load assignments: {0}")]
    Aggregate(String),

    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),
}

impl PortalError {
    /// Classify a failed token request.
    ///
    /// 401 means bad credentials and 5xx means the backend is broken.
    /// Everything else is reported as a connectivity problem.
    pub fn from_login_failure(err: &ApiError) -> Self {
        match err.status() {
            Some(401) => PortalError::InvalidCredentials,
            Some(status) if status >= 500 => PortalError::ServerError,
            _ => PortalError::NetworkError,
        }
    }

    /// Pass the backend's `detail` message through, or fall back to `fallback`.
    pub fn with_detail(err: &ApiError, fallback: &str) -> Self {
        match err.detail() {
            Some(detail) => PortalError::BackendDetail(detail.to_string()),
            None => PortalError::GenericFailure(fallback.to_string()),
        }
    }

    /// Wrap a failed read into a fixed user-facing message.
    pub fn request(message: &'static str, source: ApiError) -> Self {
        PortalError::Request { message, source }
    }

    /// True for errors produced before any network call was made.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            PortalError::Validation(_)
                | PortalError::NotAuthenticated
                | PortalError::StudentNotSelected
        )
    }
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, PortalError>;
