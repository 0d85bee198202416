// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Repository layout derived from the catalog.
//!
//! A record lives at `{root}/user/{owner}/{record}` or
//! `{root}/project/{owner}/{record}`, so its expected location follows from
//! its owner.

use async_trait::async_trait;
use sdms_acl_core::{AclError, ObjectId, OwnerId};
use sdms_server_authz::RepositoryPaths;
use sdms_server_db::AccessRepository;

/// A single repository whose record locations come from catalog ownership.
pub struct CatalogPaths {
	repo_id: String,
	root: String,
	access: AccessRepository,
}

impl CatalogPaths {
	pub fn new(repo_id: String, root: String, access: AccessRepository) -> Self {
		Self {
			repo_id,
			root,
			access,
		}
	}
}

#[async_trait]
impl RepositoryPaths for CatalogPaths {
	async fn root_path(&self, repo_id: &str) -> Result<Option<String>, AclError> {
		Ok((repo_id == self.repo_id).then(|| self.root.clone()))
	}

	async fn is_path_consistent(&self, record: &ObjectId, path: &str) -> Result<bool, AclError> {
		let Some(object) = self.access.get_object(record).await? else {
			return Ok(false);
		};
		Ok(record_location(&self.root, &object.owner, record) == path.trim_end_matches('/'))
	}
}

fn record_location(root: &str, owner: &OwnerId, record: &ObjectId) -> String {
	let dir = match owner {
		OwnerId::User(_) => "user",
		OwnerId::Project(_) => "project",
	};
	format!(
		"{}/{dir}/{}/{}",
		root.trim_end_matches('/'),
		owner.key(),
		record.key()
	)
}
