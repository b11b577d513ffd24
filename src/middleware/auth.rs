// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token request interceptor.

use crate::services::session::SessionContext;
use reqwest::RequestBuilder;

/// Attaches the session's current credential to outgoing requests.
///
/// The credential is read when the request is built, so a login or logout
/// between two calls takes effect on the next call.
#[derive(Clone)]
pub struct BearerAuth {
    session: SessionContext,
}

impl BearerAuth {
    pub fn new(session: SessionContext) -> Self {
        Self { session }
    }

    /// Add `Authorization: Bearer <token>` if a credential is held.
    pub async fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.credential().await {
            Some(credential) => request.bearer_auth(credential.expose()),
            None => request,
        }
    }
}
