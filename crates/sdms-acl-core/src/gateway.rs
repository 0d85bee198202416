// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! File-transfer gateway decision table.
//!
//! The gateway maps a `(verb, path category)` pair to a [`PathStrategy`]. The
//! table is a `const` over two closed enums, so selecting a strategy never
//! touches shared state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AclError;

// =============================================================================
// Verbs and Path Categories
// =============================================================================

/// Filesystem verb reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridAction {
	Read,
	Write,
	Create,
	Delete,
	Chdir,
	Lookup,
}

impl GridAction {
	pub const ALL: [GridAction; 6] = [
		GridAction::Read,
		GridAction::Write,
		GridAction::Create,
		GridAction::Delete,
		GridAction::Chdir,
		GridAction::Lookup,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			GridAction::Read => "read",
			GridAction::Write => "write",
			GridAction::Create => "create",
			GridAction::Delete => "delete",
			GridAction::Chdir => "chdir",
			GridAction::Lookup => "lookup",
		}
	}
}

impl fmt::Display for GridAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for GridAction {
	type Err = AclError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		GridAction::ALL
			.into_iter()
			.find(|action| action.as_str() == s)
			.ok_or_else(|| AclError::InvalidParameter(format!("unknown gateway action '{s}'")))
	}
}

/// Where a path sits relative to a repository root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathCategory {
	/// `{root}/user/{u}`
	User,
	/// `{root}/user/{u}/{record}`
	UserRecord,
	/// `{root}/project/{p}`
	Project,
	/// `{root}/project/{p}/{record}`
	ProjectRecord,
	/// A proper prefix of the root.
	RepoBase,
	/// The root itself.
	RepoRoot,
	/// `{root}/user` or `{root}/project`
	Repo,
}

impl PathCategory {
	const fn index(self) -> usize {
		match self {
			PathCategory::User => 0,
			PathCategory::UserRecord => 1,
			PathCategory::Project => 2,
			PathCategory::ProjectRecord => 3,
			PathCategory::RepoBase => 4,
			PathCategory::RepoRoot => 5,
			PathCategory::Repo => 6,
		}
	}
}

/// What the gateway does for a given verb and path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStrategy {
	/// Allowed without further checks.
	None,
	/// Always rejected.
	Denied,
	/// Requires READ_DATA on the record named by the path.
	ReadRecord,
	/// Requires WRITE_DATA on the record named by the path.
	CreateRecord,
}

// =============================================================================
// Decision Table
// =============================================================================

use PathStrategy::{CreateRecord, Denied, None as Allow, ReadRecord};

/// Rows follow [`GridAction::ALL`]; columns follow [`PathCategory::index`].
const AUTHZ_TABLE: [[PathStrategy; 7]; 6] = [
	// user, user-record, project, project-record, repo-base, repo-root, repo
	[Allow, ReadRecord, Allow, ReadRecord, Allow, Allow, Allow],
	[Allow, Allow, Allow, Allow, Allow, Allow, Allow],
	[Allow, CreateRecord, Allow, CreateRecord, Allow, Allow, Allow],
	[Denied, Denied, Denied, Denied, Denied, Denied, Denied],
	[Allow, Allow, Allow, Allow, Allow, Allow, Allow],
	[Allow, Allow, Allow, Allow, Allow, Allow, Allow],
];

pub const fn strategy_for(action: GridAction, category: PathCategory) -> PathStrategy {
	let row = match action {
		GridAction::Read => 0,
		GridAction::Write => 1,
		GridAction::Create => 2,
		GridAction::Delete => 3,
		GridAction::Chdir => 4,
		GridAction::Lookup => 5,
	};
	AUTHZ_TABLE[row][category.index()]
}

// =============================================================================
// Path Classification
// =============================================================================

fn trim_trailing_slash(path: &str) -> &str {
	path.strip_suffix('/').unwrap_or(path)
}

/// Classifies `path` against the repository root, or `None` if it lies
/// outside the repository layout.
pub fn classify_path(root: &str, path: &str) -> Option<PathCategory> {
	let root = trim_trailing_slash(root);
	let path = trim_trailing_slash(path);

	if path.len() == root.len() {
		return (path == root).then_some(PathCategory::RepoRoot);
	}

	if path.len() < root.len() {
		return root
			.strip_prefix(path)
			.is_some_and(|rest| rest.starts_with('/'))
			.then_some(PathCategory::RepoBase);
	}

	let relative = path.strip_prefix(root)?.strip_prefix('/')?;
	let components: Vec<&str> = relative.split('/').filter(|c| !c.is_empty()).collect();

	match (components.first().copied(), components.len()) {
		(Some("user" | "project"), 1) => Some(PathCategory::Repo),
		(Some("user"), 2) => Some(PathCategory::User),
		(Some("user"), 3) => Some(PathCategory::UserRecord),
		(Some("project"), 2) => Some(PathCategory::Project),
		(Some("project"), 3) => Some(PathCategory::ProjectRecord),
		_ => None,
	}
}

/// The record key named by the last component of a record path.
pub fn record_key(path: &str) -> Option<&str> {
	trim_trailing_slash(path)
		.rsplit('/')
		.next()
		.filter(|key| !key.is_empty())
}
