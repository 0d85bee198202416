// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identifier types for catalog vertices.
//!
//! Every identifier is a prefixed string (`u/`, `p/`, `g/`, `d/`, `c/`). The
//! newtypes here validate the prefix once at the boundary so the rest of the
//! engine never re-checks it:
//!
//! - [`UserId`], [`ProjectId`], [`GroupId`] for identities
//! - [`ObjectId`] for securable objects (data records and collections)
//! - [`OwnerId`] and [`SubjectId`] for the two places a user-or-something id is allowed

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AclError;

// =============================================================================
// Prefixed ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $prefix:literal, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);

		impl $name {
			pub const PREFIX: &'static str = $prefix;

			/// Parse a full id, checking the prefix and that the key is non-empty.
			pub fn parse(id: impl Into<String>) -> Result<Self, AclError> {
				let id = id.into();
				match id.strip_prefix($prefix) {
					Some(key) if !key.is_empty() => Ok(Self(id)),
					_ => Err(AclError::InvalidId(format!(
						"'{id}' is not a valid {} id",
						stringify!($name)
					))),
				}
			}

			/// Build an id from its key (the part after the prefix).
			pub fn from_key(key: &str) -> Self {
				Self(format!("{}{}", $prefix, key))
			}

			pub fn as_str(&self) -> &str {
				&self.0
			}

			pub fn key(&self) -> &str {
				&self.0[$prefix.len()..]
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl TryFrom<String> for $name {
			type Error = AclError;

			fn try_from(id: String) -> Result<Self, Self::Error> {
				Self::parse(id)
			}
		}

		impl From<$name> for String {
			fn from(id: $name) -> Self {
				id.0
			}
		}

		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
	};
}

define_id_type!(UserId, "u/", "Unique identifier for a user.");
define_id_type!(ProjectId, "p/", "Unique identifier for a project.");
define_id_type!(GroupId, "g/", "Identifier for a group, `g/{owner}:{name}` once qualified.");

impl GroupId {
	/// True for `g/{owner}:{name}`, false for the short `g/{name}` form.
	pub fn is_qualified(&self) -> bool {
		self.key().contains(':')
	}

	/// Expand a short group id against the key of the object's owner.
	pub fn qualify(&self, owner_key: &str) -> GroupId {
		if self.is_qualified() {
			self.clone()
		} else {
			GroupId::from_key(&format!("{owner_key}:{}", self.key()))
		}
	}

	/// The `g/{name}` form used when reporting rules back to callers.
	pub fn short_form(&self) -> GroupId {
		match self.key().split_once(':') {
			Some((_, name)) => GroupId::from_key(name),
			None => self.clone(),
		}
	}

	pub fn owner_key(&self) -> Option<&str> {
		self.key().split_once(':').map(|(owner, _)| owner)
	}
}

// =============================================================================
// Securable Objects
// =============================================================================

/// Kind of securable object, derived from the id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
	Data,
	Collection,
}

impl ObjectKind {
	pub fn prefix(self) -> &'static str {
		match self {
			ObjectKind::Data => "d/",
			ObjectKind::Collection => "c/",
		}
	}
}

impl fmt::Display for ObjectKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ObjectKind::Data => write!(f, "data"),
			ObjectKind::Collection => write!(f, "collection"),
		}
	}
}

/// Identifier of a data record (`d/`) or collection (`c/`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
	pub fn parse(id: impl Into<String>) -> Result<Self, AclError> {
		let id = id.into();
		let valid = [ObjectKind::Data, ObjectKind::Collection]
			.iter()
			.any(|kind| id.strip_prefix(kind.prefix()).is_some_and(|key| !key.is_empty()));
		if valid {
			Ok(Self(id))
		} else {
			Err(AclError::InvalidId(format!(
				"'{id}' is not a data record or collection id"
			)))
		}
	}

	pub fn data(key: &str) -> Self {
		Self(format!("d/{key}"))
	}

	pub fn collection(key: &str) -> Self {
		Self(format!("c/{key}"))
	}

	pub fn kind(&self) -> ObjectKind {
		if self.0.starts_with("c/") {
			ObjectKind::Collection
		} else {
			ObjectKind::Data
		}
	}

	pub fn is_collection(&self) -> bool {
		self.kind() == ObjectKind::Collection
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn key(&self) -> &str {
		&self.0[2..]
	}
}

impl fmt::Display for ObjectId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl TryFrom<String> for ObjectId {
	type Error = AclError;

	fn try_from(id: String) -> Result<Self, Self::Error> {
		Self::parse(id)
	}
}

impl From<ObjectId> for String {
	fn from(id: ObjectId) -> Self {
		id.0
	}
}

// =============================================================================
// Owners and Subjects
// =============================================================================

/// The user or project an object belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OwnerId {
	User(UserId),
	Project(ProjectId),
}

impl OwnerId {
	pub fn parse(id: impl Into<String>) -> Result<Self, AclError> {
		let id = id.into();
		if id.starts_with(UserId::PREFIX) {
			UserId::parse(id).map(OwnerId::User)
		} else if id.starts_with(ProjectId::PREFIX) {
			ProjectId::parse(id).map(OwnerId::Project)
		} else {
			Err(AclError::InvalidId(format!("'{id}' is not a user or project id")))
		}
	}

	pub fn as_str(&self) -> &str {
		match self {
			OwnerId::User(id) => id.as_str(),
			OwnerId::Project(id) => id.as_str(),
		}
	}

	pub fn key(&self) -> &str {
		match self {
			OwnerId::User(id) => id.key(),
			OwnerId::Project(id) => id.key(),
		}
	}

	pub fn is_user(&self, user: &UserId) -> bool {
		matches!(self, OwnerId::User(id) if id == user)
	}
}

impl fmt::Display for OwnerId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl TryFrom<String> for OwnerId {
	type Error = AclError;

	fn try_from(id: String) -> Result<Self, Self::Error> {
		Self::parse(id)
	}
}

impl From<OwnerId> for String {
	fn from(id: OwnerId) -> Self {
		id.as_str().to_string()
	}
}

/// The user or group an ACL rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SubjectId {
	User(UserId),
	Group(GroupId),
}

impl SubjectId {
	pub fn parse(id: impl Into<String>) -> Result<Self, AclError> {
		let id = id.into();
		if id.starts_with(UserId::PREFIX) {
			UserId::parse(id).map(SubjectId::User)
		} else if id.starts_with(GroupId::PREFIX) {
			GroupId::parse(id).map(SubjectId::Group)
		} else {
			Err(AclError::InvalidId(format!("'{id}' is not a user or group id")))
		}
	}

	pub fn as_str(&self) -> &str {
		match self {
			SubjectId::User(id) => id.as_str(),
			SubjectId::Group(id) => id.as_str(),
		}
	}

	/// Group subjects reported in their short `g/{name}` form.
	pub fn display_form(&self) -> String {
		match self {
			SubjectId::User(id) => id.to_string(),
			SubjectId::Group(id) => id.short_form().to_string(),
		}
	}
}

impl fmt::Display for SubjectId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl TryFrom<String> for SubjectId {
	type Error = AclError;

	fn try_from(id: String) -> Result<Self, Self::Error> {
		Self::parse(id)
	}
}

impl From<SubjectId> for String {
	fn from(id: SubjectId) -> Self {
		id.as_str().to_string()
	}
}

impl From<UserId> for SubjectId {
	fn from(id: UserId) -> Self {
		SubjectId::User(id)
	}
}

impl From<GroupId> for SubjectId {
	fn from(id: GroupId) -> Self {
		SubjectId::Group(id)
	}
}
