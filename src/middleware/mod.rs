// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request interceptors applied by the API client.

pub mod auth;

pub use auth::BearerAuth;
