// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session lifecycle: login, profile lookup, logout and signup.
//!
//! [`SessionContext`] is the single owner of the current identity and
//! credential. It is cloned into the [`BearerAuth`](crate::middleware::BearerAuth)
//! interceptor, which is how academic requests get authenticated without the
//! data store ever touching the session itself.
//!
//! Invariant: `is_authenticated` implies a user and a credential are held.
//! Every failure path in [`SessionStore`] ends in a full logout, so the
//! session is never left half-authenticated.

use crate::db::{keys, KeyValueStore, StorageError};
use crate::error::{PortalError, Result};
use crate::models::user::{
    Credential, Role, RoleDetails, SignupForm, StudentSignup, TeacherSignup, UserProfile,
};
use crate::services::api::PortalClient;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use validator::Validate;

/// Observable session state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user: Option<UserProfile>,
    pub is_authenticated: bool,
    pub role: Option<Role>,
}

#[derive(Default)]
struct SessionState {
    session: Session,
    credential: Option<Credential>,
}

/// Shared handle to the session and its persisted keys.
#[derive(Clone)]
pub struct SessionContext {
    state: Arc<RwLock<SessionState>>,
    storage: Arc<dyn KeyValueStore>,
}

impl SessionContext {
    /// Empty, unauthenticated session backed by `storage`.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            storage,
        }
    }

    /// Rebuild the session from persisted keys.
    ///
    /// The session is authenticated only when both a token and a readable
    /// user record exist. Anything less is treated as stale and wiped.
    pub fn restore(storage: Arc<dyn KeyValueStore>) -> Self {
        let state = match read_persisted(storage.as_ref()) {
            Ok(Some(state)) => {
                tracing::info!(
                    username = state
                        .session
                        .user
                        .as_ref()
                        .map(|u| u.username.as_str())
                        .unwrap_or_default(),
                    role = ?state.session.role,
                    "Restored persisted session"
                );
                state
            }
            Ok(None) => {
                wipe_persisted(storage.as_ref());
                SessionState::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted session, starting logged out");
                wipe_persisted(storage.as_ref());
                SessionState::default()
            }
        };

        Self {
            state: Arc::new(RwLock::new(state)),
            storage,
        }
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    pub async fn snapshot(&self) -> Session {
        self.state.read().await.session.clone()
    }

    pub async fn credential(&self) -> Option<Credential> {
        self.state.read().await.credential.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.session.is_authenticated
    }

    pub async fn role(&self) -> Option<Role> {
        self.state.read().await.session.role
    }

    /// Hold `credential` and persist it under `access_token`.
    pub(crate) async fn set_credential(
        &self,
        credential: Credential,
    ) -> std::result::Result<(), StorageError> {
        self.storage
            .set(keys::ACCESS_TOKEN, credential.expose())?;
        self.state.write().await.credential = Some(credential);
        Ok(())
    }

    /// Record the profile and role, persisting both.
    pub(crate) async fn set_profile(
        &self,
        user: UserProfile,
        role: Role,
    ) -> std::result::Result<(), StorageError> {
        let encoded = serde_json::to_string(&user).map_err(|source| StorageError::Encode {
            key: keys::USER,
            source,
        })?;
        self.storage.set(keys::USER, &encoded)?;
        self.storage.set(keys::USER_ROLE, role.as_str())?;

        let mut state = self.state.write().await;
        state.session.user = Some(user);
        state.session.role = Some(role);
        Ok(())
    }

    /// Flip to authenticated. Only valid once a credential and user are held.
    pub(crate) async fn mark_authenticated(&self) -> bool {
        let mut state = self.state.write().await;
        let ready = state.credential.is_some() && state.session.user.is_some();
        state.session.is_authenticated = ready;
        ready
    }

    /// Drop all in-memory and persisted session fields.
    pub async fn clear(&self) {
        {
            let mut state = self.state.write().await;
            *state = SessionState::default();
        }
        wipe_persisted(self.storage.as_ref());
    }
}

/// `Ok(None)` when there is no complete persisted session.
fn read_persisted(
    storage: &dyn KeyValueStore,
) -> std::result::Result<Option<SessionState>, StorageError> {
    let Some(token) = storage.get(keys::ACCESS_TOKEN)? else {
        return Ok(None);
    };
    let Some(raw_user) = storage.get(keys::USER)? else {
        tracing::warn!("Persisted token without user record, discarding");
        return Ok(None);
    };
    let user: UserProfile = match serde_json::from_str(&raw_user) {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Persisted user record unreadable, discarding");
            return Ok(None);
        }
    };
    let role = storage
        .get(keys::USER_ROLE)?
        .and_then(|raw| raw.parse::<Role>().ok());

    Ok(Some(SessionState {
        session: Session {
            user: Some(user),
            is_authenticated: true,
            role,
        },
        credential: Some(Credential::new(token)),
    }))
}

fn wipe_persisted(storage: &dyn KeyValueStore) {
    for key in keys::ALL {
        if let Err(e) = storage.remove(key) {
            tracing::warn!(key, error = %e, "Failed to clear persisted session key");
        }
    }
}

/// Session store: the only component that mutates the session.
#[derive(Clone)]
pub struct SessionStore {
    client: PortalClient,
    context: SessionContext,
}

impl SessionStore {
    pub fn new(client: PortalClient, context: SessionContext) -> Self {
        Self { client, context }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub async fn session(&self) -> Session {
        self.context.snapshot().await
    }

    /// Log in with username and password and return the resolved role.
    ///
    /// On any failure the session is logged out before the error is returned.
    pub async fn login(&self, username: &str, password: &str) -> Result<Role> {
        match self.try_login(username, password).await {
            Ok(role) => {
                tracing::info!(username, role = %role, "Logged in");
                Ok(role)
            }
            Err(e) => {
                tracing::warn!(username, error = %e, "Login failed");
                self.logout().await;
                Err(e)
            }
        }
    }

    async fn try_login(&self, username: &str, password: &str) -> Result<Role> {
        let token = self
            .client
            .request_token(username, password)
            .await
            .map_err(|e| PortalError::from_login_failure(&e))?;

        let credential = Credential::new(token.access_token);
        self.context.set_credential(credential.clone()).await?;

        self.fetch_user_info(&credential).await?;

        let role = self.context.role().await.ok_or(PortalError::ProfileFetch)?;
        if !self.context.mark_authenticated().await {
            return Err(PortalError::ProfileFetch);
        }
        Ok(role)
    }

    /// Load the profile behind `credential` and set user and role from it.
    ///
    /// A profile without exactly one role flag is rejected and logs out.
    pub async fn fetch_user_info(&self, credential: &Credential) -> Result<()> {
        let me = match self.client.current_user(credential).await {
            Ok(me) => me,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch user info");
                self.logout().await;
                return Err(PortalError::ProfileFetch);
            }
        };

        let Some(role) = me.role() else {
            tracing::warn!(
                user_id = me.user_id,
                is_student = me.is_student,
                is_teacher = me.is_teacher,
                "Profile does not identify a single role"
            );
            self.logout().await;
            return Err(PortalError::ProfileFetch);
        };

        if let Err(e) = self.context.set_profile(me.profile(), role).await {
            self.logout().await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Re-read the profile with the credential already held.
    pub async fn refresh_user_info(&self) -> Result<()> {
        let credential = self
            .context
            .credential()
            .await
            .ok_or(PortalError::NotAuthenticated)?;
        self.fetch_user_info(&credential).await
    }

    /// Clear the session. No network call; safe to call repeatedly.
    pub async fn logout(&self) {
        self.context.clear().await;
        tracing::debug!("Session cleared");
    }

    /// Register a new student or teacher account.
    ///
    /// The form is validated locally first; nothing is sent if it fails.
    pub async fn signup(&self, form: &SignupForm) -> Result<()> {
        validate_signup(form)?;

        let user = form.new_user();
        let result = match &form.details {
            RoleDetails::Teacher { title, department } => self
                .client
                .create_teacher(&TeacherSignup {
                    title: title.clone(),
                    department: department.clone(),
                    user,
                })
                .await
                .map(|t| t.user.user_id),
            RoleDetails::Student { grade, major } => self
                .client
                .create_student(&StudentSignup {
                    grade: grade.clone(),
                    major: major.clone(),
                    user,
                })
                .await
                .map(|s| s.user.user_id),
        };

        match result {
            Ok(user_id) => {
                tracing::info!(
                    username = %form.username,
                    role = %form.details.role(),
                    user_id,
                    "Account registered"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(username = %form.username, error = %e, "Registration failed");
                Err(PortalError::with_detail(&e, "Registration failed"))
            }
        }
    }
}

/// Check required fields, then the password confirmation.
pub fn validate_signup(form: &SignupForm) -> Result<()> {
    let Err(errors) = form.validate() else {
        return Ok(());
    };

    let fields = errors.field_errors();
    if SignupForm::REQUIRED_FIELDS
        .iter()
        .any(|f| fields.contains_key(*f))
    {
        return Err(PortalError::Validation(
            "Please fill in all required fields".to_string(),
        ));
    }
    Err(PortalError::Validation("Passwords do not match".to_string()))
}
