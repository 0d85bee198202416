// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections. Each has a resolved type and an `Option`-only
//! layer that sources produce and merge.

mod authz;
mod database;
mod logging;

pub use authz::{AuthzConfig, AuthzConfigLayer, DEFAULT_MAX_INHERITANCE_DEPTH};
pub use database::{DatabaseConfig, DatabaseConfigLayer, DEFAULT_BUSY_TIMEOUT_MS};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
