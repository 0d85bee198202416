// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error taxonomy shared by every access-control component.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors raised while parsing, mutating or evaluating access rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AclError {
	#[error("Invalid permission: {0}")]
	InvalidPermission(String),

	#[error("Object not found: {0}")]
	ObjectNotFound(String),

	#[error("Permission denied: {0}")]
	PermissionDenied(String),

	#[error("Invalid ID: {0}")]
	InvalidId(String),

	#[error("Invalid parameter: {0}")]
	InvalidParameter(String),

	#[error("Internal: {0}")]
	Internal(String),
}

pub type Result<T> = std::result::Result<T, AclError>;

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
	InvalidPermission,
	ObjectNotFound,
	PermissionDenied,
	InvalidId,
	InvalidParameter,
	Internal,
}

impl fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			ErrorCode::InvalidPermission => "invalid_permission",
			ErrorCode::ObjectNotFound => "object_not_found",
			ErrorCode::PermissionDenied => "permission_denied",
			ErrorCode::InvalidId => "invalid_id",
			ErrorCode::InvalidParameter => "invalid_parameter",
			ErrorCode::Internal => "internal",
		};
		write!(f, "{s}")
	}
}

/// Structured `{code, message}` body handed to the routing layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
	pub code: ErrorCode,
	pub message: String,
}

impl AclError {
	pub fn code(&self) -> ErrorCode {
		match self {
			AclError::InvalidPermission(_) => ErrorCode::InvalidPermission,
			AclError::ObjectNotFound(_) => ErrorCode::ObjectNotFound,
			AclError::PermissionDenied(_) => ErrorCode::PermissionDenied,
			AclError::InvalidId(_) => ErrorCode::InvalidId,
			AclError::InvalidParameter(_) => ErrorCode::InvalidParameter,
			AclError::Internal(_) => ErrorCode::Internal,
		}
	}

	/// The detail message without the category prefix.
	pub fn message(&self) -> &str {
		match self {
			AclError::InvalidPermission(m)
			| AclError::ObjectNotFound(m)
			| AclError::PermissionDenied(m)
			| AclError::InvalidId(m)
			| AclError::InvalidParameter(m)
			| AclError::Internal(m) => m,
		}
	}

	pub fn to_body(&self) -> ErrorBody {
		ErrorBody {
			code: self.code(),
			message: self.message().to_string(),
		}
	}
}

impl From<&AclError> for ErrorBody {
	fn from(err: &AclError) -> Self {
		err.to_body()
	}
}
