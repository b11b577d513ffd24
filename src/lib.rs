// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Campus Portal: client for the student/teacher course management API.
//!
//! This crate provides the session lifecycle, typed access to courses,
//! assignments and submissions, and client-side assignment status.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod time_utils;

use config::Config;
use db::KeyValueStore;
use services::{AcademicStore, NotificationStore, PortalClient, SessionContext, SessionStore};
use std::sync::Arc;

/// Client state: the three stores sharing one session context.
pub struct Portal {
    pub config: Config,
    pub session: SessionStore,
    pub academic: AcademicStore,
    pub notifications: NotificationStore,
}

impl Portal {
    /// Build the stores, restoring any session persisted in `storage`.
    pub fn new(config: Config, storage: Arc<dyn KeyValueStore>) -> anyhow::Result<Self> {
        let context = SessionContext::restore(storage);
        let client = PortalClient::new(&config, context.clone())?;

        Ok(Self {
            session: SessionStore::new(client.clone(), context),
            academic: AcademicStore::new(client),
            notifications: NotificationStore::new(config.toast_delay),
            config,
        })
    }
}
