// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access-control service.
//!
//! [`AclService`] loads an [`AccessSnapshot`] from storage and hands it to the
//! pure evaluator in `sdms-acl-core`. Nothing is cached: every call recomputes
//! from the catalog.

use std::sync::Arc;

use sdms_acl_core::{
	effective_permission, is_administrator, is_allowed, is_allowed_any, AccessSnapshot, AclEntryView,
	AclError, AclRuleRequest, ObjectId, Permissions, UserId,
};
use sdms_server_db::{AccessRepository, AccessStore, AclRepository, DbError, DEFAULT_MAX_DEPTH};
use sqlx::sqlite::SqlitePool;

use crate::audit::{self, AuditAction};
use crate::mutator::apply_rule_edits;

/// Evaluates and edits object permissions.
#[derive(Clone)]
pub struct AclService {
	access: Arc<dyn AccessStore>,
	acl: AclRepository,
	max_depth: usize,
}

impl AclService {
	pub fn new(pool: SqlitePool) -> Self {
		Self {
			access: Arc::new(AccessRepository::new(pool.clone())),
			acl: AclRepository::new(pool),
			max_depth: DEFAULT_MAX_DEPTH,
		}
	}

	/// Bound on the ancestor walk. Values below 1 are clamped to 1.
	pub fn with_max_depth(mut self, max_depth: usize) -> Self {
		self.max_depth = max_depth.max(1);
		self
	}

	pub fn max_depth(&self) -> usize {
		self.max_depth
	}

	async fn snapshot(&self, client: &UserId, object: &ObjectId) -> Result<AccessSnapshot, AclError> {
		self.access
			.load_snapshot(client, object, self.max_depth)
			.await
			.map_err(|err| snapshot_error(err, client))
	}

	/// The client's effective mask on the object.
	///
	/// # Errors
	/// - `ObjectNotFound` if the object does not exist
	/// - `PermissionDenied` if the client is not a known user
	#[tracing::instrument(skip(self), fields(client_id = %client, object_id = %object))]
	pub async fn effective_permission(
		&self,
		client: &UserId,
		object: &ObjectId,
	) -> Result<Permissions, AclError> {
		let snapshot = self.snapshot(client, object).await?;
		Ok(effective_permission(&snapshot))
	}

	/// Succeeds when the client holds every bit of `required`.
	#[tracing::instrument(skip(self), fields(client_id = %client, object_id = %object, required = %required))]
	pub async fn authorize(
		&self,
		client: &UserId,
		object: &ObjectId,
		required: Permissions,
	) -> Result<(), AclError> {
		let snapshot = self.snapshot(client, object).await?;
		if is_allowed(&snapshot, required) {
			Ok(())
		} else {
			Err(audit::deny(client, object, AuditAction::Authorize(required)))
		}
	}

	/// Succeeds when the client holds at least one bit of `mask`.
	#[tracing::instrument(skip(self), fields(client_id = %client, object_id = %object, mask = %mask))]
	pub async fn authorize_any(
		&self,
		client: &UserId,
		object: &ObjectId,
		mask: Permissions,
	) -> Result<(), AclError> {
		let snapshot = self.snapshot(client, object).await?;
		if is_allowed_any(&snapshot, mask) {
			Ok(())
		} else {
			Err(audit::deny(client, object, AuditAction::AuthorizeAny(mask)))
		}
	}

	/// Apply a batch of rule edits to one object.
	///
	/// Every request is parsed before anything is written, and all edits share
	/// one transaction: either every rule is stored or none is. The client must
	/// administer the object or hold ADMIN on it.
	#[tracing::instrument(skip(self, rules), fields(client_id = %client, object_id = %object, rules = rules.len()))]
	pub async fn update_acl(
		&self,
		client: &UserId,
		object: &ObjectId,
		rules: &[AclRuleRequest],
	) -> Result<(), AclError> {
		let parsed = rules
			.iter()
			.map(AclRuleRequest::parse)
			.collect::<Result<Vec<_>, _>>()?;

		let mut tx = self.acl.begin().await?;
		let snapshot = tx
			.load_snapshot(client, object, self.max_depth)
			.await
			.map_err(|err| snapshot_error(err, client))?;
		if !holds_admin(&snapshot) {
			return Err(audit::deny(client, object, AuditAction::UpdateAcl));
		}

		for request in &parsed {
			apply_rule_edits(&mut tx, object, request).await?;
		}

		tx.commit().await?;
		tracing::debug!(client_id = %client, object_id = %object, rules = parsed.len(), "acl updated");
		Ok(())
	}

	/// The object's ACL edges followed by its default rule, if set.
	#[tracing::instrument(skip(self), fields(client_id = %client, object_id = %object))]
	pub async fn view_acl(
		&self,
		client: &UserId,
		object: &ObjectId,
	) -> Result<Vec<AclEntryView>, AclError> {
		let snapshot = self.snapshot(client, object).await?;
		if !holds_admin(&snapshot) {
			return Err(audit::deny(client, object, AuditAction::ViewAcl));
		}

		let mut entries: Vec<AclEntryView> = self
			.access
			.list_rules(object)
			.await?
			.iter()
			.map(AclEntryView::from_rule)
			.collect();
		entries.extend(AclEntryView::from_default(&snapshot.object.masks));
		Ok(entries)
	}

	/// True when the object or one of its ancestors is public.
	pub async fn is_public_read(&self, object: &ObjectId) -> Result<bool, AclError> {
		Ok(self.access.is_public_read(object, self.max_depth).await?)
	}

	pub async fn user_exists(&self, user: &UserId) -> Result<bool, AclError> {
		Ok(self.access.user_exists(user).await?)
	}
}

fn holds_admin(snapshot: &AccessSnapshot) -> bool {
	is_administrator(snapshot) || effective_permission(snapshot).contains(Permissions::ADMIN)
}

/// An unknown client is a denial, not a missing object.
fn snapshot_error(err: DbError, client: &UserId) -> AclError {
	match err {
		DbError::NotFound(id) if id == client.as_str() => {
			AclError::PermissionDenied(format!("unknown client {client}"))
		}
		other => other.into(),
	}
}
