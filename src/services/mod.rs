// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - API client and client-side stores.

pub mod academic;
pub mod api;
pub mod assignment_status;
pub mod notification;
pub mod session;

pub use academic::AcademicStore;
pub use api::{ApiError, PortalClient};
pub use assignment_status::derive_statuses;
pub use notification::{NotificationStore, Toast, ToastKind};
pub use session::{Session, SessionContext, SessionStore};
