// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit logging for access-control decisions.
//!
//! Denials and gateway outcomes are emitted as structured `tracing` events
//! under the `sdms::audit` target so they can be routed separately from
//! ordinary service logs.

use sdms_acl_core::{AclError, ObjectId, Permissions, UserId};

/// The operation a denied client attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
	Authorize(Permissions),
	AuthorizeAny(Permissions),
	UpdateAcl,
	ViewAcl,
}

impl AuditAction {
	fn describe(self) -> String {
		match self {
			AuditAction::Authorize(mask) => format!("authorize {}", mask.to_letters()),
			AuditAction::AuthorizeAny(mask) => format!("authorize_any {}", mask.to_letters()),
			AuditAction::UpdateAcl => "update_acl".to_string(),
			AuditAction::ViewAcl => "view_acl".to_string(),
		}
	}
}

/// Record a denied request and build the matching error.
pub fn deny(client: &UserId, object: &ObjectId, action: AuditAction) -> AclError {
	let action = action.describe();
	tracing::warn!(
		target: "sdms::audit",
		client_id = %client,
		object_id = %object,
		action = %action,
		"access denied"
	);
	AclError::PermissionDenied(format!("{client} may not {action} on {object}"))
}

/// Record the outcome of a gateway check.
pub fn gateway_outcome(
	client: Option<&UserId>,
	verb: &str,
	path: &str,
	result: &Result<(), AclError>,
) {
	let client = client.map_or("anonymous", UserId::as_str);
	match result {
		Ok(()) => tracing::info!(
			target: "sdms::audit",
			client_id = client,
			verb,
			path,
			"AUTHZ SUCCESS"
		),
		Err(err) => tracing::warn!(
			target: "sdms::audit",
			client_id = client,
			verb,
			path,
			code = %err.code(),
			error = %err,
			"AUTHZ FAILED"
		),
	}
}
