// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission evaluation engine.
//!
//! [`effective_permission`] resolves the mask a client holds on an object in
//! two phases:
//!
//! 1. **Administrator check**: system administrators, the owner, registered
//!    administrators of the owner and the record's creator get every bit
//! 2. **Rule combination**: the object's default rule, the client's matching
//!    ACL edges and the inherited masks are ORed into a total grant and a
//!    total deny, and deny wins on every shared bit
//!
//! Everything here is a pure function over an [`AccessSnapshot`].

use tracing::instrument;

use crate::permission::Permissions;

use super::inheritance::inherited_mask;
use super::types::AccessSnapshot;

/// True when the client has full rights on the object regardless of rules.
pub fn is_administrator(snapshot: &AccessSnapshot) -> bool {
	let client = &snapshot.client;
	let object = &snapshot.object;

	client.is_admin
		|| object.owner.is_user(&client.user_id)
		|| snapshot.administers_owner
		|| object.creator.as_ref() == Some(&client.user_id)
}

/// Grant and deny from the object's default rule and matching ACL edges.
fn local_masks(snapshot: &AccessSnapshot) -> (Permissions, Permissions) {
	let mut grant = snapshot.object.masks.grant();
	let mut deny = snapshot.object.masks.deny();

	if snapshot.object.public {
		grant |= Permissions::PUBLIC;
	}

	for rule in snapshot.matching_rules() {
		grant |= rule.masks.grant();
		deny |= rule.masks.deny();
	}

	(grant, deny)
}

/// Computes the client's effective mask on the object.
#[instrument(
	level = "debug",
	skip(snapshot),
	fields(
		client_id = %snapshot.client.user_id,
		object_id = %snapshot.object.id,
	)
)]
pub fn effective_permission(snapshot: &AccessSnapshot) -> Permissions {
	if is_administrator(snapshot) {
		return Permissions::ALL;
	}

	if snapshot.object.locked {
		return Permissions::NONE;
	}

	let (local_grant, local_deny) = local_masks(snapshot);
	let inherited = inherited_mask(&snapshot.ancestors, &snapshot.client);

	let grant = local_grant | inherited.grant;
	let deny = local_deny | inherited.deny;

	grant & !deny
}

/// True when the effective mask holds every bit of `required`.
pub fn is_allowed(snapshot: &AccessSnapshot, required: Permissions) -> bool {
	effective_permission(snapshot).contains(required)
}

/// True when the effective mask holds at least one bit of `mask`.
pub fn is_allowed_any(snapshot: &AccessSnapshot, mask: Permissions) -> bool {
	effective_permission(snapshot).intersects(mask)
}
