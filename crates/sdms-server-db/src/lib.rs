// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite storage for the SDMS catalog.
//!
//! Repositories follow one shape: a cloneable struct over a [`SqlitePool`]
//! with `#[tracing::instrument]`ed async methods returning [`DbError`].
//!
//! - [`CatalogRepository`]: users, projects, groups, objects and hierarchy edges
//! - [`AccessRepository`]: read-only snapshot loading for evaluation
//! - [`AclRepository`]: transactional default-rule and ACL edge writes
//!
//! [`SqlitePool`]: sqlx::sqlite::SqlitePool

pub mod access;
pub mod acl;
pub mod catalog;
pub mod error;
pub mod pool;
pub mod schema;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use access::{AccessRepository, AccessStore, DEFAULT_MAX_DEPTH};
pub use acl::{AclRepository, AclTransaction};
pub use catalog::CatalogRepository;
pub use error::{DbError, Result};
pub use pool::create_pool;
pub use schema::run_migrations;
