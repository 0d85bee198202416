// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Applies parsed rule edits inside an open ACL transaction.

use sdms_acl_core::{AclError, ObjectId, OwnerId, ParsedRuleRequest, RuleTarget, SubjectId};
use sdms_server_db::AclTransaction;

/// Expand a short `g/{name}` subject against the object owner's key.
pub fn qualify_subject(subject: &SubjectId, owner: &OwnerId) -> SubjectId {
	match subject {
		SubjectId::Group(group) => SubjectId::Group(group.qualify(owner.key())),
		SubjectId::User(_) => subject.clone(),
	}
}

/// Apply one rule edit to an object's default rule or one of its ACL edges.
///
/// Reads the current state through the transaction so that several edits to
/// the same rule in one batch compose. The caller must already have checked
/// that the client administers the object.
///
/// # Errors
/// - `InvalidPermission` for inheritable edits on a data record
/// - `ObjectNotFound` if the object or the subject does not exist
#[tracing::instrument(skip(tx, request), fields(object_id = %object))]
pub async fn apply_rule_edits(
	tx: &mut AclTransaction,
	object: &ObjectId,
	request: &ParsedRuleRequest,
) -> Result<(), AclError> {
	request.edits.check_target(object.kind())?;

	let attrs = tx
		.get_object(object)
		.await?
		.ok_or_else(|| AclError::ObjectNotFound(object.to_string()))?;

	match &request.target {
		RuleTarget::Default => {
			let masks = attrs.masks.apply(&request.edits);
			tx.set_default_rule(object, &masks).await?;
		}
		RuleTarget::Subject(subject) => {
			let subject = qualify_subject(subject, &attrs.owner);
			if !tx.subject_exists(&subject).await? {
				return Err(AclError::ObjectNotFound(subject.to_string()));
			}

			let current = tx.get_rule(object, &subject).await?.unwrap_or_default();
			let masks = current.apply(&request.edits);
			tx.put_rule(object, &subject, &masks).await?;
		}
	}

	Ok(())
}
