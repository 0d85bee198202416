// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sdms_acl_core::AclError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Internal: {0}")]
	Internal(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

impl DbError {
	/// True when another writer holds the database lock and the caller should retry.
	pub fn is_busy(&self) -> bool {
		match self {
			DbError::Sqlx(sqlx::Error::Database(e)) => e
				.code()
				.and_then(|code| code.parse::<i32>().ok())
				.is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED)),
			_ => false,
		}
	}
}

impl From<DbError> for AclError {
	fn from(err: DbError) -> Self {
		if err.is_busy() {
			return AclError::Internal(format!("concurrent update in progress, retry: {err}"));
		}
		match err {
			DbError::NotFound(what) => AclError::ObjectNotFound(what),
			other => AclError::Internal(other.to_string()),
		}
	}
}

/// Map a write failure, reporting key collisions as `Conflict`.
pub(crate) fn write_error(err: sqlx::Error, what: &str) -> DbError {
	if let sqlx::Error::Database(e) = &err {
		if e.is_unique_violation() {
			return DbError::Conflict(format!("{what} already exists"));
		}
	}
	DbError::Sqlx(err)
}
