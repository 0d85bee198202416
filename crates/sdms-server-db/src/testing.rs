// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sdms_acl_core::{GroupId, ObjectId, OwnerId, ProjectId, RuleMasks, SubjectId, UserId};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::acl::AclRepository;
use crate::catalog::CatalogRepository;
use crate::schema::run_migrations;

/// Single-connection in-memory pool with the catalog schema applied.
pub async fn create_test_pool() -> SqlitePool {
	let options = SqliteConnectOptions::from_str(":memory:")
		.unwrap()
		.foreign_keys(true)
		.create_if_missing(true);

	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.connect_with(options)
		.await
		.expect("Failed to create test pool");

	run_migrations(&pool).await.expect("Failed to apply schema");
	pool
}

/// Seeding shorthand over [`CatalogRepository`] for tests. Ids are given as
/// bare keys except where the role is ambiguous.
pub struct Catalog {
	repo: CatalogRepository,
	acl: AclRepository,
}

impl Catalog {
	pub fn new(pool: &SqlitePool) -> Self {
		Self {
			repo: CatalogRepository::new(pool.clone()),
			acl: AclRepository::new(pool.clone()),
		}
	}

	pub async fn user(&self, key: &str) -> UserId {
		let id = UserId::from_key(key);
		self.repo.create_user(&id, false).await.unwrap();
		id
	}

	pub async fn system_admin(&self, key: &str) -> UserId {
		let id = UserId::from_key(key);
		self.repo.create_user(&id, true).await.unwrap();
		id
	}

	pub async fn project(&self, key: &str) -> ProjectId {
		let id = ProjectId::from_key(key);
		self.repo.create_project(&id, None).await.unwrap();
		id
	}

	pub async fn owned_project(&self, key: &str, owner_key: &str) -> ProjectId {
		let id = ProjectId::from_key(key);
		self.repo
			.create_project(&id, Some(&UserId::from_key(owner_key)))
			.await
			.unwrap();
		id
	}

	/// `key` is `owner:name`; `owner` is a full `u/` or `p/` id.
	pub async fn group(&self, key: &str, owner: &str) -> GroupId {
		self.repo
			.create_group(&GroupId::from_key(key), &OwnerId::parse(owner).unwrap())
			.await
			.unwrap()
	}

	pub async fn member(&self, group_key: &str, user_key: &str) {
		self.repo
			.add_member(&GroupId::from_key(group_key), &UserId::from_key(user_key))
			.await
			.unwrap();
	}

	pub async fn admin(&self, owner: &str, user_key: &str) {
		self.repo
			.add_admin(&OwnerId::parse(owner).unwrap(), &UserId::from_key(user_key))
			.await
			.unwrap();
	}

	pub async fn collection(&self, key: &str, owner: &str) -> ObjectId {
		let id = ObjectId::collection(key);
		self.repo
			.create_collection(&id, &OwnerId::parse(owner).unwrap(), false)
			.await
			.unwrap();
		id
	}

	pub async fn record(&self, key: &str, owner: &str) -> ObjectId {
		let id = ObjectId::data(key);
		self.repo
			.create_record(&id, &OwnerId::parse(owner).unwrap(), None)
			.await
			.unwrap();
		id
	}

	pub async fn record_by(&self, key: &str, owner: &str, creator_key: &str) -> ObjectId {
		let id = ObjectId::data(key);
		self.repo
			.create_record(
				&id,
				&OwnerId::parse(owner).unwrap(),
				Some(&UserId::from_key(creator_key)),
			)
			.await
			.unwrap();
		id
	}

	/// Link two full object ids.
	pub async fn link(&self, parent: &str, child: &str) {
		self.repo
			.link(&ObjectId::parse(parent).unwrap(), &ObjectId::parse(child).unwrap())
			.await
			.unwrap();
	}

	pub async fn set_public(&self, object: &str) {
		self.repo
			.set_public(&ObjectId::parse(object).unwrap(), true)
			.await
			.unwrap();
	}

	pub async fn set_locked(&self, object: &str) {
		self.repo
			.set_locked(&ObjectId::parse(object).unwrap(), true)
			.await
			.unwrap();
	}

	/// Store a default rule directly, bypassing permission checks.
	pub async fn default_rule(&self, object: &str, masks: RuleMasks) {
		let mut tx = self.acl.begin().await.unwrap();
		tx.set_default_rule(&ObjectId::parse(object).unwrap(), &masks)
			.await
			.unwrap();
		tx.commit().await.unwrap();
	}

	/// Store an ACL edge directly, bypassing permission checks.
	pub async fn rule(&self, object: &str, subject: &str, masks: RuleMasks) {
		let mut tx = self.acl.begin().await.unwrap();
		tx.put_rule(
			&ObjectId::parse(object).unwrap(),
			&SubjectId::parse(subject).unwrap(),
			&masks,
		)
		.await
		.unwrap();
		tx.commit().await.unwrap();
	}
}
