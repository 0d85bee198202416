// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute snapshots consumed by the evaluator.
//!
//! - [`ClientAttrs`]: the requesting user, its administrator flag and groups
//! - [`ObjectAttrs`]: the object being accessed and its default rule
//! - [`AncestorAttrs`]: one collection above the object, with its rules
//! - [`AccessSnapshot`]: everything above, loaded in one read
//!
//! Snapshots are built by the storage layer before evaluation starts. The
//! evaluator itself never reads storage and never mutates a snapshot.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::rule::{AclRule, RuleMasks};
use crate::types::{GroupId, ObjectId, OwnerId, SubjectId, UserId};

/// The user making a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAttrs {
	pub user_id: UserId,
	/// System administrator flag from the user record.
	pub is_admin: bool,
	/// Groups the user is a direct member of, fully qualified.
	pub groups: BTreeSet<GroupId>,
}

impl ClientAttrs {
	pub fn new(user_id: UserId) -> Self {
		Self {
			user_id,
			is_admin: false,
			groups: BTreeSet::new(),
		}
	}

	pub fn with_admin(mut self, is_admin: bool) -> Self {
		self.is_admin = is_admin;
		self
	}

	pub fn with_groups(mut self, groups: impl IntoIterator<Item = GroupId>) -> Self {
		self.groups.extend(groups);
		self
	}

	/// True when a rule for `subject` applies to this client.
	pub fn matches(&self, subject: &SubjectId) -> bool {
		match subject {
			SubjectId::User(id) => *id == self.user_id,
			SubjectId::Group(id) => self.groups.contains(id),
		}
	}
}

/// The record or collection being accessed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectAttrs {
	pub id: ObjectId,
	pub owner: OwnerId,
	pub creator: Option<UserId>,
	/// The object's own default rule.
	pub masks: RuleMasks,
	pub public: bool,
	pub locked: bool,
}

impl ObjectAttrs {
	pub fn new(id: ObjectId, owner: OwnerId) -> Self {
		Self {
			id,
			owner,
			creator: None,
			masks: RuleMasks::CLOSED,
			public: false,
			locked: false,
		}
	}
}

/// A collection above the object in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestorAttrs {
	pub id: ObjectId,
	pub masks: RuleMasks,
	pub public: bool,
	/// ACL edges on this collection.
	pub rules: Vec<AclRule>,
}

impl AncestorAttrs {
	pub fn new(id: ObjectId) -> Self {
		Self {
			id,
			masks: RuleMasks::CLOSED,
			public: false,
			rules: Vec::new(),
		}
	}
}

/// All facts needed to evaluate one client against one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessSnapshot {
	pub client: ClientAttrs,
	pub object: ObjectAttrs,
	/// The client is a registered administrator of the object's owner.
	pub administers_owner: bool,
	/// ACL edges on the object itself.
	pub rules: Vec<AclRule>,
	/// Ancestor collections, nearest level first.
	pub ancestors: Vec<AncestorAttrs>,
	/// The hierarchy walk stopped at its depth bound.
	pub walk_truncated: bool,
}

impl AccessSnapshot {
	pub fn new(client: ClientAttrs, object: ObjectAttrs) -> Self {
		Self {
			client,
			object,
			administers_owner: false,
			rules: Vec::new(),
			ancestors: Vec::new(),
			walk_truncated: false,
		}
	}

	/// Edges on the object whose subject matches the client.
	pub fn matching_rules(&self) -> impl Iterator<Item = &AclRule> {
		self.rules.iter().filter(|rule| self.client.matches(&rule.subject))
	}

	/// True when the object or any ancestor collection is public.
	pub fn is_public_read(&self) -> bool {
		self.object.public || self.ancestors.iter().any(|a| a.public)
	}
}
