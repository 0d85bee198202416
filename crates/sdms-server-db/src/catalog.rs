// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Catalog repository for database operations.
//!
//! This module provides the write side of the catalog graph:
//! - Users, projects and groups
//! - Group membership and owner administrators
//! - Records and collections, each created with a fully closed default rule
//! - Hierarchy (`items`) edges and the public/locked flags

use sdms_acl_core::{GroupId, ObjectId, ObjectKind, OwnerId, ProjectId, UserId};
use sqlx::sqlite::SqlitePool;

use crate::error::{write_error, DbError};

/// Repository for catalog vertices and edges.
#[derive(Clone)]
pub struct CatalogRepository {
	pool: SqlitePool,
}

impl CatalogRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	// =========================================================================
	// Identities
	// =========================================================================

	/// Create a user.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the user already exists.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn create_user(&self, id: &UserId, is_admin: bool) -> Result<(), DbError> {
		sqlx::query("INSERT INTO users (id, is_admin) VALUES (?, ?)")
			.bind(id.as_str())
			.bind(i64::from(is_admin))
			.execute(&self.pool)
			.await
			.map_err(|e| write_error(e, id.as_str()))?;

		tracing::debug!(user_id = %id, is_admin, "user created");
		Ok(())
	}

	/// Create a project. Its owner administers everything the project owns.
	#[tracing::instrument(skip(self, owner), fields(project_id = %id, owner_id = owner.map(UserId::as_str)))]
	pub async fn create_project(&self, id: &ProjectId, owner: Option<&UserId>) -> Result<(), DbError> {
		sqlx::query("INSERT INTO projects (id, owner_id) VALUES (?, ?)")
			.bind(id.as_str())
			.bind(owner.map(UserId::as_str))
			.execute(&self.pool)
			.await
			.map_err(|e| write_error(e, id.as_str()))?;

		tracing::debug!(project_id = %id, "project created");
		Ok(())
	}

	/// Create a group owned by a user or project.
	///
	/// Short group ids are qualified with the owner's key before storing.
	#[tracing::instrument(skip(self), fields(group_id = %id, owner_id = %owner))]
	pub async fn create_group(&self, id: &GroupId, owner: &OwnerId) -> Result<GroupId, DbError> {
		let id = id.qualify(owner.key());
		sqlx::query("INSERT INTO user_groups (id, owner_id) VALUES (?, ?)")
			.bind(id.as_str())
			.bind(owner.as_str())
			.execute(&self.pool)
			.await
			.map_err(|e| write_error(e, id.as_str()))?;

		tracing::debug!(group_id = %id, "group created");
		Ok(id)
	}

	#[tracing::instrument(skip(self), fields(group_id = %group, user_id = %user))]
	pub async fn add_member(&self, group: &GroupId, user: &UserId) -> Result<(), DbError> {
		sqlx::query("INSERT OR IGNORE INTO members (group_id, user_id) VALUES (?, ?)")
			.bind(group.as_str())
			.bind(user.as_str())
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	/// Register `user` as an administrator of a project or user owner.
	#[tracing::instrument(skip(self), fields(owner_id = %owner, user_id = %user))]
	pub async fn add_admin(&self, owner: &OwnerId, user: &UserId) -> Result<(), DbError> {
		sqlx::query("INSERT OR IGNORE INTO admins (owner_id, user_id) VALUES (?, ?)")
			.bind(owner.as_str())
			.bind(user.as_str())
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	// =========================================================================
	// Objects
	// =========================================================================

	/// Create a collection with a fully closed default rule.
	///
	/// # Errors
	/// Returns `DbError::Internal` if `id` is not a collection id and
	/// `DbError::Conflict` if it already exists.
	#[tracing::instrument(skip(self), fields(object_id = %id, owner_id = %owner))]
	pub async fn create_collection(
		&self,
		id: &ObjectId,
		owner: &OwnerId,
		is_root: bool,
	) -> Result<(), DbError> {
		expect_kind(id, ObjectKind::Collection)?;
		self.insert_object(id, owner, is_root, None).await
	}

	/// Create a data record with a fully closed default rule.
	#[tracing::instrument(skip(self), fields(object_id = %id, owner_id = %owner))]
	pub async fn create_record(
		&self,
		id: &ObjectId,
		owner: &OwnerId,
		creator: Option<&UserId>,
	) -> Result<(), DbError> {
		expect_kind(id, ObjectKind::Data)?;
		self.insert_object(id, owner, false, creator).await
	}

	async fn insert_object(
		&self,
		id: &ObjectId,
		owner: &OwnerId,
		is_root: bool,
		creator: Option<&UserId>,
	) -> Result<(), DbError> {
		let mut tx = self.pool.begin().await?;

		sqlx::query("INSERT INTO objects (id, is_root, creator) VALUES (?, ?, ?)")
			.bind(id.as_str())
			.bind(i64::from(is_root))
			.bind(creator.map(|c| c.as_str()))
			.execute(&mut *tx)
			.await
			.map_err(|e| write_error(e, id.as_str()))?;

		sqlx::query("INSERT INTO owners (object_id, owner_id) VALUES (?, ?)")
			.bind(id.as_str())
			.bind(owner.as_str())
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;
		tracing::debug!(object_id = %id, owner_id = %owner, "object created");
		Ok(())
	}

	/// Link `child` under the collection `parent`.
	#[tracing::instrument(skip(self), fields(parent_id = %parent, child_id = %child))]
	pub async fn link(&self, parent: &ObjectId, child: &ObjectId) -> Result<(), DbError> {
		expect_kind(parent, ObjectKind::Collection)?;
		sqlx::query("INSERT OR IGNORE INTO items (parent_id, child_id) VALUES (?, ?)")
			.bind(parent.as_str())
			.bind(child.as_str())
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(object_id = %id))]
	pub async fn set_public(&self, id: &ObjectId, public: bool) -> Result<(), DbError> {
		self.set_flag(id, "public", public).await
	}

	#[tracing::instrument(skip(self), fields(object_id = %id))]
	pub async fn set_locked(&self, id: &ObjectId, locked: bool) -> Result<(), DbError> {
		self.set_flag(id, "locked", locked).await
	}

	async fn set_flag(&self, id: &ObjectId, column: &'static str, value: bool) -> Result<(), DbError> {
		let result = sqlx::query(&format!("UPDATE objects SET {column} = ? WHERE id = ?"))
			.bind(i64::from(value))
			.bind(id.as_str())
			.execute(&self.pool)
			.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(id.to_string()));
		}
		Ok(())
	}

	/// Delete an object together with its default rule, ACL and edges.
	#[tracing::instrument(skip(self), fields(object_id = %id))]
	pub async fn delete_object(&self, id: &ObjectId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM objects WHERE id = ?")
			.bind(id.as_str())
			.execute(&self.pool)
			.await?;

		let deleted = result.rows_affected() > 0;
		tracing::debug!(object_id = %id, deleted, "object deleted");
		Ok(deleted)
	}
}

fn expect_kind(id: &ObjectId, kind: ObjectKind) -> Result<(), DbError> {
	if id.kind() == kind {
		Ok(())
	} else {
		Err(DbError::Internal(format!("{id} is not a {kind}")))
	}
}
